use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{AppSettings, EditRequest, Note, NoteId};
use crate::session::EditingSession;
use crate::store::NoteStore;
use std::path::Path;
use std::sync::Arc;
use tokio::time::Duration;

#[derive(Clone)]
pub struct NotebookCore {
    store: Arc<dyn NoteStore>,
    settings: AppSettings,
}

impl NotebookCore {
    pub fn new(store: Arc<dyn NoteStore>, settings: AppSettings) -> Self {
        Self { store, settings }
    }

    pub fn open(app_data_dir: &Path) -> AppResult<Self> {
        let db_path = app_data_dir.join("notes.sqlite");
        let db = Database::new(&db_path)?;
        let settings = db.get_settings()?;
        tracing::info!(path = %db.path().display(), "note store opened");
        Ok(Self::new(Arc::new(db), settings))
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.settings.search_debounce_ms)
    }

    pub fn begin_edit(&self, request: EditRequest) -> EditingSession {
        EditingSession::start(self.clone(), request)
    }

    pub async fn fetch_all(&self) -> AppResult<Vec<Note>> {
        self.with_store("fetch_all", |store| store.fetch_all_ordered_by_recency())
            .await
    }

    pub async fn insert_or_replace(&self, note: Note) -> AppResult<Note> {
        self.with_store("insert_or_replace", move |store| store.insert_or_replace(&note))
            .await
    }

    pub async fn delete(&self, id: NoteId) -> AppResult<()> {
        let removed = self.with_store("delete", move |store| store.delete(id)).await?;
        if !removed {
            return Err(AppError::NotFound(format!("Note {} no longer exists", id)));
        }
        Ok(())
    }

    async fn with_store<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn NoteStore) -> AppResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || call(store.as_ref())).await?;
        if let Err(error) = &result {
            tracing::warn!(operation, error = %error, "note store call failed");
        }
        result
    }
}
