use crate::models::Note;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

pub fn filter_notes(source: &Arc<Vec<Note>>, query: &str) -> Arc<Vec<Note>> {
    if query.trim().is_empty() {
        return Arc::clone(source);
    }

    let needle = query.to_lowercase();
    Arc::new(
        source
            .iter()
            .filter(|note| note.contains_lowercase(&needle))
            .cloned()
            .collect(),
    )
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub generation: u64,
    pub query: String,
    pub notes: Arc<Vec<Note>>,
}

#[derive(Debug)]
struct SearchHandle {
    generation: u64,
    task: JoinHandle<()>,
}

#[derive(Debug)]
pub struct SearchFilter {
    debounce: Duration,
    sender: mpsc::UnboundedSender<SearchResult>,
    pending: Option<SearchHandle>,
    generation: u64,
}

impl SearchFilter {
    pub fn new(debounce: Duration) -> (Self, mpsc::UnboundedReceiver<SearchResult>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                debounce,
                sender,
                pending: None,
                generation: 0,
            },
            receiver,
        )
    }

    pub fn on_query_changed(&mut self, query: &str, source: Arc<Vec<Note>>) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let debounce = self.debounce;
        let query = query.to_string();
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let notes = filter_notes(&source, &query);
            tracing::debug!(generation, query = %query, matches = notes.len(), "search run finished");
            let _ = sender.send(SearchResult {
                generation,
                query,
                notes,
            });
        });

        self.pending = Some(SearchHandle { generation, task });
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.task.abort();
            tracing::trace!(generation = handle.generation, "pending search canceled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn complete(&mut self, result: &SearchResult) -> bool {
        match &self.pending {
            Some(handle) if handle.generation == result.generation => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for SearchFilter {
    fn drop(&mut self) {
        self.cancel();
    }
}
