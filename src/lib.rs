pub mod attachments;
pub mod browser;
pub mod db;
pub mod errors;
pub mod list;
pub mod models;
pub mod notebook;
pub mod search;
pub mod session;
pub mod store;

pub use crate::browser::NoteBrowser;
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{
    AppSettings, EditOutcome, EditRequest, EditResult, ListChange, Note, NoteColor, NoteId, QuickAction,
};
pub use crate::notebook::NotebookCore;
pub use crate::session::{EditAction, EditingSession, SessionMode};
pub use crate::store::NoteStore;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn run(app_data_dir: &Path) -> AppResult<NotebookCore> {
    std::fs::create_dir_all(app_data_dir)?;
    init_tracing(app_data_dir).map_err(AppError::Internal)?;

    let core = NotebookCore::open(app_data_dir)?;
    tracing::info!(
        debounce_ms = core.settings().search_debounce_ms,
        "notebook ready"
    );
    Ok(core)
}

pub fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "notebook.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
