use crate::db::Database;
use crate::errors::AppResult;
use crate::models::{Note, NoteId};

pub trait NoteStore: Send + Sync {
    fn insert_or_replace(&self, note: &Note) -> AppResult<Note>;
    // Most recently created first.
    fn fetch_all_ordered_by_recency(&self) -> AppResult<Vec<Note>>;
    fn delete(&self, id: NoteId) -> AppResult<bool>;
}

impl NoteStore for Database {
    fn insert_or_replace(&self, note: &Note) -> AppResult<Note> {
        self.insert_or_replace_note(note)
    }

    fn fetch_all_ordered_by_recency(&self) -> AppResult<Vec<Note>> {
        self.list_notes()
    }

    fn delete(&self, id: NoteId) -> AppResult<bool> {
        self.delete_note(id)
    }
}
