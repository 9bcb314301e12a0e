use crate::errors::{AppError, AppResult};
use crate::models::{ListChange, Note};
use std::sync::Arc;

#[derive(Debug)]
pub struct NoteList {
    source: Arc<Vec<Note>>,
    displayed: Arc<Vec<Note>>,
}

impl Default for NoteList {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteList {
    pub fn new() -> Self {
        let source = Arc::new(Vec::new());
        Self {
            displayed: Arc::clone(&source),
            source,
        }
    }

    pub fn source(&self) -> &Arc<Vec<Note>> {
        &self.source
    }

    pub fn displayed(&self) -> &[Note] {
        &self.displayed
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn is_filtered(&self) -> bool {
        !Arc::ptr_eq(&self.source, &self.displayed)
    }

    pub fn replace_all(&mut self, notes: Vec<Note>) -> ListChange {
        self.source = Arc::new(notes);
        self.displayed = Arc::clone(&self.source);
        ListChange::FullReset
    }

    pub fn reconcile_after_create(&mut self, snapshot: &[Note]) -> AppResult<ListChange> {
        let Some(created) = snapshot.first() else {
            return Err(AppError::Reconcile(
                "store returned no notes after a create".to_string(),
            ));
        };

        let was_filtered = self.is_filtered();
        self.source_mut().insert(0, created.clone());
        Ok(self.settle(ListChange::InsertedAt(0), was_filtered))
    }

    pub fn reconcile_after_update(
        &mut self,
        clicked_index: usize,
        snapshot: &[Note],
        was_deleted: bool,
    ) -> AppResult<ListChange> {
        if clicked_index >= self.source.len() {
            return Err(AppError::Reconcile(format!(
                "clicked index {} outside cached list of {}",
                clicked_index,
                self.source.len()
            )));
        }
        let replacement = if was_deleted {
            None
        } else {
            let Some(updated) = snapshot.get(clicked_index) else {
                return Err(AppError::Reconcile(format!(
                    "clicked index {} outside store snapshot of {}",
                    clicked_index,
                    snapshot.len()
                )));
            };
            Some(updated.clone())
        };

        let was_filtered = self.is_filtered();
        let notes = self.source_mut();
        notes.remove(clicked_index);
        let change = match replacement {
            None => ListChange::RemovedAt(clicked_index),
            Some(updated) => {
                notes.insert(clicked_index, updated);
                ListChange::ChangedAt(clicked_index)
            }
        };
        Ok(self.settle(change, was_filtered))
    }

    pub fn show_filtered(&mut self, filtered: Arc<Vec<Note>>) -> ListChange {
        self.displayed = filtered;
        ListChange::FullReset
    }

    fn source_mut(&mut self) -> &mut Vec<Note> {
        // Release the displayed alias first so make_mut does not copy.
        self.displayed = Arc::new(Vec::new());
        Arc::make_mut(&mut self.source)
    }

    fn settle(&mut self, change: ListChange, was_filtered: bool) -> ListChange {
        self.displayed = Arc::clone(&self.source);
        if was_filtered {
            ListChange::FullReset
        } else {
            change
        }
    }
}
