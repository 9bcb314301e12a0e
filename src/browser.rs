use crate::errors::{AppError, AppResult};
use crate::list::NoteList;
use crate::models::{EditOutcome, EditRequest, EditResult, ListChange, Note, QuickAction};
use crate::notebook::NotebookCore;
use crate::search::{SearchFilter, SearchResult};
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct PendingEdit {
    request_id: Uuid,
    clicked_index: Option<usize>,
}

pub struct NoteBrowser {
    core: NotebookCore,
    list: NoteList,
    search: SearchFilter,
    search_results: mpsc::UnboundedReceiver<SearchResult>,
    query: String,
    changes: mpsc::UnboundedSender<ListChange>,
    pending_edit: Option<PendingEdit>,
}

impl NoteBrowser {
    pub fn new(core: NotebookCore) -> (Self, mpsc::UnboundedReceiver<ListChange>) {
        let (changes, change_receiver) = mpsc::unbounded_channel();
        let (search, search_results) = SearchFilter::new(core.search_debounce());
        (
            Self {
                core,
                list: NoteList::new(),
                search,
                search_results,
                query: String::new(),
                changes,
                pending_edit: None,
            },
            change_receiver,
        )
    }

    pub fn notes(&self) -> &[Note] {
        self.list.displayed()
    }

    pub fn list(&self) -> &NoteList {
        &self.list
    }

    pub async fn load_all(&mut self) -> AppResult<&[Note]> {
        let notes = self.core.fetch_all().await?;
        tracing::info!(count = notes.len(), "notes loaded");
        let change = self.list.replace_all(notes);
        self.publish(change);
        Ok(self.list.displayed())
    }

    pub fn request_create(&mut self, quick_action: Option<QuickAction>) -> AppResult<EditRequest> {
        let request = EditRequest::create(quick_action);
        self.track(&request)?;
        Ok(request)
    }

    // `displayed_index` may be a row of a filtered view; the request carries
    // the matching index in the unfiltered cache.
    pub fn open_note(&mut self, displayed_index: usize) -> AppResult<EditRequest> {
        let note = self
            .list
            .displayed()
            .get(displayed_index)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No note at row {}", displayed_index)))?;
        let clicked_index = if self.list.is_filtered() {
            self.list
                .source()
                .iter()
                .position(|candidate| candidate.id == note.id)
                .ok_or_else(|| AppError::Reconcile("tapped note missing from cache".to_string()))?
        } else {
            displayed_index
        };

        let request = EditRequest::open(clicked_index, note);
        self.track(&request)?;
        Ok(request)
    }

    pub async fn on_edit_result(&mut self, result: EditResult) -> AppResult<Option<ListChange>> {
        let pending = match self.pending_edit {
            Some(pending) if pending.request_id == result.request_id => pending,
            _ => {
                return Err(AppError::Reconcile(format!(
                    "no open editor for request {}",
                    result.request_id
                )))
            }
        };
        self.pending_edit = None;

        let snapshot = match result.outcome {
            EditOutcome::Canceled => return Ok(None),
            EditOutcome::Deleted(_) => Vec::new(),
            EditOutcome::Created(_) | EditOutcome::Updated(_) => self.core.fetch_all().await?,
        };

        // A run scheduled against the old cache would overwrite the reconciled view.
        self.search.cancel();
        let change = match result.outcome {
            EditOutcome::Created(_) => self.list.reconcile_after_create(&snapshot)?,
            EditOutcome::Updated(_) => {
                let clicked_index = Self::clicked_index(pending)?;
                self.list.reconcile_after_update(clicked_index, &snapshot, false)?
            }
            EditOutcome::Deleted(_) => {
                let clicked_index = Self::clicked_index(pending)?;
                self.list.reconcile_after_update(clicked_index, &snapshot, true)?
            }
            EditOutcome::Canceled => return Ok(None),
        };

        self.publish(change);
        self.resume_search();
        Ok(Some(change))
    }

    pub fn on_query_changed(&mut self, query: &str) {
        self.query = query.to_string();
        self.search.cancel();
        if self.list.is_empty() {
            return;
        }
        self.search
            .on_query_changed(query, std::sync::Arc::clone(self.list.source()));
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cancel_search(&mut self) {
        self.search.cancel();
    }

    pub async fn next_search_result(&mut self) -> Option<ListChange> {
        while let Some(result) = self.search_results.recv().await {
            if let Some(change) = self.apply_search_result(result) {
                return Some(change);
            }
        }
        None
    }

    pub fn apply_search_result(&mut self, result: SearchResult) -> Option<ListChange> {
        if !self.search.complete(&result) {
            tracing::trace!(generation = result.generation, "stale search result dropped");
            return None;
        }
        let change = self.list.show_filtered(result.notes);
        self.publish(change);
        Some(change)
    }

    fn resume_search(&mut self) {
        if self.query.trim().is_empty() || self.list.is_empty() {
            return;
        }
        self.search
            .on_query_changed(&self.query, std::sync::Arc::clone(self.list.source()));
    }

    fn track(&mut self, request: &EditRequest) -> AppResult<()> {
        if self.pending_edit.is_some() {
            return Err(AppError::Reconcile("an editor is already open".to_string()));
        }
        self.pending_edit = Some(PendingEdit {
            request_id: request.request_id,
            clicked_index: request.clicked_index,
        });
        Ok(())
    }

    fn clicked_index(pending: PendingEdit) -> AppResult<usize> {
        pending
            .clicked_index
            .ok_or_else(|| AppError::Reconcile("update result for a create request".to_string()))
    }

    fn publish(&self, change: ListChange) {
        let _ = self.changes.send(change);
    }
}
