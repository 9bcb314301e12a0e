use crate::attachments::{validate_image_path, validate_web_url};
use crate::errors::{AppError, AppResult};
use crate::models::{
    EditOutcome, EditRequest, EditResult, Note, NoteColor, QuickAction, DEFAULT_DATE_TIME_FORMAT,
};
use crate::notebook::NotebookCore;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fmt::Write;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    Creating,
    Editing { base: Note },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    SetTitle(String),
    SetSubtitle(String),
    SetBody(String),
    SelectColor(NoteColor),
    AttachImage(String),
    RemoveImage,
    AttachWebLink(String),
    RemoveWebLink,
}

pub struct EditingSession {
    core: NotebookCore,
    request_id: Uuid,
    clicked_index: Option<usize>,
    mode: SessionMode,
    title: String,
    subtitle: String,
    body: String,
    date_time: String,
    color: NoteColor,
    image_path: Option<String>,
    web_link: Option<String>,
    closed: bool,
}

impl EditingSession {
    pub(crate) fn start(core: NotebookCore, request: EditRequest) -> Self {
        let mut session = match request.note {
            Some(base) => Self {
                request_id: request.request_id,
                clicked_index: request.clicked_index,
                title: base.title.clone(),
                subtitle: base.subtitle.clone(),
                body: base.body.clone(),
                date_time: base.date_time.clone(),
                color: base.color,
                image_path: base.image_path.clone().filter(|path| !path.trim().is_empty()),
                web_link: base.web_link.clone().filter(|link| !link.trim().is_empty()),
                mode: SessionMode::Editing { base },
                closed: false,
                core,
            },
            None => Self {
                request_id: request.request_id,
                clicked_index: request.clicked_index,
                mode: SessionMode::Creating,
                title: String::new(),
                subtitle: String::new(),
                body: String::new(),
                date_time: format_date_time(Local::now(), &core.settings().date_time_format),
                color: core.settings().default_color,
                image_path: None,
                web_link: None,
                closed: false,
                core,
            },
        };

        if let Some(quick_action) = request.quick_action {
            let action = match quick_action {
                QuickAction::Image(path) => EditAction::AttachImage(path),
                QuickAction::WebLink(url) => EditAction::AttachWebLink(url),
            };
            if let Err(error) = session.apply(action) {
                tracing::warn!(error = %error, "quick action attachment not applied");
            }
        }

        session
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn is_creating(&self) -> bool {
        matches!(self.mode, SessionMode::Creating)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn date_time(&self) -> &str {
        &self.date_time
    }

    pub fn color(&self) -> NoteColor {
        self.color
    }

    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    pub fn web_link(&self) -> Option<&str> {
        self.web_link.as_deref()
    }

    pub fn apply(&mut self, action: EditAction) -> AppResult<()> {
        self.ensure_open()?;
        match action {
            EditAction::SetTitle(title) => self.title = title,
            EditAction::SetSubtitle(subtitle) => self.subtitle = subtitle,
            EditAction::SetBody(body) => self.body = body,
            EditAction::SelectColor(color) => self.color = color,
            EditAction::AttachImage(path) => self.image_path = Some(validate_image_path(&path)?),
            EditAction::RemoveImage => self.image_path = None,
            EditAction::AttachWebLink(url) => self.web_link = Some(validate_web_url(&url)?),
            EditAction::RemoveWebLink => self.web_link = None,
        }
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Note title can't be empty".to_string()));
        }
        if self.subtitle.trim().is_empty() && self.body.trim().is_empty() {
            return Err(AppError::Validation("Note can't be empty".to_string()));
        }
        Ok(())
    }

    pub fn to_note(&self) -> Note {
        let id = match &self.mode {
            SessionMode::Creating => None,
            SessionMode::Editing { base } => base.id,
        };
        Note {
            id,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            body: self.body.clone(),
            date_time: self.date_time.clone(),
            color: self.color,
            image_path: self.image_path.clone(),
            web_link: self.web_link.clone(),
        }
    }

    pub async fn save(&mut self) -> AppResult<EditResult> {
        self.ensure_open()?;
        if let Err(error) = self.validate() {
            tracing::debug!(reason = %error.user_message(), "note save rejected");
            return Err(error);
        }

        let stored = self.core.insert_or_replace(self.to_note()).await?;
        self.closed = true;

        let outcome = if self.is_creating() {
            EditOutcome::Created(stored)
        } else {
            EditOutcome::Updated(stored)
        };
        tracing::info!(note_id = ?outcome_note_id(&outcome), update = outcome.was_update(), "note saved");
        Ok(self.result(outcome))
    }

    pub async fn delete(&mut self) -> AppResult<EditResult> {
        self.ensure_open()?;
        let base = match &self.mode {
            SessionMode::Editing { base } => base.clone(),
            SessionMode::Creating => {
                return Err(AppError::NotFound("Unsaved notes cannot be deleted".to_string()))
            }
        };
        let id = base
            .id
            .ok_or_else(|| AppError::NotFound("Note was never saved".to_string()))?;

        self.core.delete(id).await?;
        self.closed = true;
        tracing::info!(note_id = id, "note deleted");
        Ok(self.result(EditOutcome::Deleted(base)))
    }

    pub fn cancel(self) -> EditResult {
        self.result(EditOutcome::Canceled)
    }

    fn result(&self, outcome: EditOutcome) -> EditResult {
        EditResult {
            request_id: self.request_id,
            clicked_index: self.clicked_index,
            outcome,
        }
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.closed {
            return Err(AppError::Internal("editing session already closed".to_string()));
        }
        Ok(())
    }
}

fn outcome_note_id(outcome: &EditOutcome) -> Option<i64> {
    match outcome {
        EditOutcome::Created(note) | EditOutcome::Updated(note) | EditOutcome::Deleted(note) => note.id,
        EditOutcome::Canceled => None,
    }
}

// Falls back to the default pattern on invalid specifiers.
pub fn format_date_time(now: DateTime<Local>, format: &str) -> String {
    let format = if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        tracing::warn!(format, "invalid date format setting, using default");
        DEFAULT_DATE_TIME_FORMAT
    } else {
        format
    };

    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", now.format(DEFAULT_DATE_TIME_FORMAT));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{format_date_time, EditAction, SessionMode};
    use crate::errors::AppError;
    use crate::models::{AppSettings, EditOutcome, EditRequest, Note, NoteColor, QuickAction};
    use crate::notebook::NotebookCore;
    use crate::store::memory::MemoryStore;
    use chrono::{Local, TimeZone};
    use std::sync::Arc;

    fn core_with(store: Arc<MemoryStore>) -> NotebookCore {
        NotebookCore::new(store, AppSettings::default())
    }

    fn saved(id: i64) -> Note {
        Note {
            id: Some(id),
            title: "Groceries".to_string(),
            subtitle: "Weekend".to_string(),
            body: "milk".to_string(),
            date_time: "Saturday, 06 January 2024 10:15 AM".to_string(),
            color: NoteColor::Indigo,
            image_path: None,
            web_link: Some("https://shop.example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn empty_title_is_rejected_without_store_call() {
        let store = Arc::new(MemoryStore::default());
        let mut session = core_with(Arc::clone(&store)).begin_edit(EditRequest::create(None));
        session.apply(EditAction::SetSubtitle("sub".to_string())).expect("apply");
        session.apply(EditAction::SetBody("body".to_string())).expect("apply");
        session.apply(EditAction::SetTitle("   ".to_string())).expect("apply");

        let error = session.save().await.expect_err("must fail");
        assert!(matches!(error, AppError::Validation(ref reason) if reason == "Note title can't be empty"));
        assert_eq!(store.call_count(), 0);
        assert!(session.is_creating());
    }

    #[tokio::test]
    async fn title_alone_is_rejected() {
        let store = Arc::new(MemoryStore::default());
        let mut session = core_with(Arc::clone(&store)).begin_edit(EditRequest::create(None));
        session.apply(EditAction::SetTitle("Title".to_string())).expect("apply");
        session.apply(EditAction::SetSubtitle(" ".to_string())).expect("apply");

        let error = session.save().await.expect_err("must fail");
        assert!(matches!(error, AppError::Validation(ref reason) if reason == "Note can't be empty"));
        assert_eq!(store.call_count(), 0);

        session.apply(EditAction::SetBody("now it has a body".to_string())).expect("apply");
        let result = session.save().await.expect("save after fix");
        assert!(matches!(result.outcome, EditOutcome::Created(ref note) if note.id.is_some()));
    }

    #[tokio::test]
    async fn new_note_gets_defaults_and_store_id() {
        let store = Arc::new(MemoryStore::default());
        let request = EditRequest::create(None);
        let request_id = request.request_id;
        let mut session = core_with(Arc::clone(&store)).begin_edit(request);
        assert_eq!(session.color(), NoteColor::Charcoal);
        assert!(!session.date_time().is_empty());

        session.apply(EditAction::SetTitle("Plan".to_string())).expect("apply");
        session.apply(EditAction::SetSubtitle("Q3".to_string())).expect("apply");
        session.apply(EditAction::SelectColor(NoteColor::Amber)).expect("apply");
        let result = session.save().await.expect("save");

        assert_eq!(result.request_id, request_id);
        assert_eq!(result.clicked_index, None);
        let EditOutcome::Created(note) = result.outcome else {
            panic!("expected created outcome");
        };
        assert_eq!(note.id, Some(1));
        assert_eq!(note.color, NoteColor::Amber);
        assert!(session.save().await.is_err());
    }

    #[tokio::test]
    async fn editing_reuses_base_id_and_timestamp() {
        let store = Arc::new(MemoryStore::default());
        let base = saved(7);
        let mut session = core_with(Arc::clone(&store)).begin_edit(EditRequest::open(3, base.clone()));
        assert_eq!(session.mode(), &SessionMode::Editing { base: base.clone() });
        assert_eq!(session.title(), "Groceries");
        assert_eq!(session.web_link(), Some("https://shop.example.com"));

        session.apply(EditAction::SetTitle("Groceries v2".to_string())).expect("apply");
        session.apply(EditAction::RemoveWebLink).expect("apply");
        let result = session.save().await.expect("save");

        assert_eq!(result.clicked_index, Some(3));
        assert!(result.outcome.was_update());
        let EditOutcome::Updated(note) = result.outcome else {
            panic!("expected updated outcome");
        };
        assert_eq!(note.id, Some(7));
        assert_eq!(note.date_time, base.date_time);
        assert_eq!(note.web_link, None);
    }

    #[tokio::test]
    async fn rejected_attachment_keeps_previous_value() {
        let store = Arc::new(MemoryStore::default());
        let mut session = core_with(store).begin_edit(EditRequest::open(0, saved(1)));

        let error = session
            .apply(EditAction::AttachWebLink("not a url".to_string()))
            .expect_err("invalid url");
        assert!(matches!(error, AppError::Attachment(_)));
        assert_eq!(session.web_link(), Some("https://shop.example.com"));

        let error = session
            .apply(EditAction::AttachImage("/definitely/missing.png".to_string()))
            .expect_err("missing image");
        assert!(matches!(error, AppError::Attachment(_)));
        assert_eq!(session.image_path(), None);
    }

    #[tokio::test]
    async fn quick_actions_preattach() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = dir.path().join("shot.jpg");
        std::fs::write(&image, b"jpg").expect("write");
        let store = Arc::new(MemoryStore::default());
        let core = core_with(store);

        let image_path = image.to_string_lossy().to_string();
        let with_image = core.begin_edit(EditRequest::create(Some(QuickAction::Image(image_path.clone()))));
        assert_eq!(with_image.image_path(), Some(image_path.as_str()));

        let with_link = core.begin_edit(EditRequest::create(Some(QuickAction::WebLink(
            "example.com".to_string(),
        ))));
        assert_eq!(with_link.web_link(), Some("example.com"));

        let with_bad_link = core.begin_edit(EditRequest::create(Some(QuickAction::WebLink(
            "nope".to_string(),
        ))));
        assert_eq!(with_bad_link.web_link(), None);
    }

    #[tokio::test]
    async fn delete_and_cancel_outcomes() {
        let store = Arc::new(MemoryStore::default());
        let core = core_with(Arc::clone(&store));
        let stored = core.insert_or_replace(saved(1)).await.expect("seed");

        let creating = core.begin_edit(EditRequest::create(None));
        assert!(matches!(creating.cancel().outcome, EditOutcome::Canceled));

        let mut unsaved = core.begin_edit(EditRequest::create(None));
        assert!(matches!(unsaved.delete().await, Err(AppError::NotFound(_))));

        let mut editing = core.begin_edit(EditRequest::open(0, stored.clone()));
        let result = editing.delete().await.expect("delete");
        assert_eq!(result.outcome, EditOutcome::Deleted(stored));
        assert!(core.fetch_all().await.expect("fetch").is_empty());
    }

    #[tokio::test]
    async fn store_failure_keeps_session_open() {
        let store = Arc::new(MemoryStore::failing());
        let mut session = core_with(Arc::clone(&store)).begin_edit(EditRequest::create(None));
        session.apply(EditAction::SetTitle("t".to_string())).expect("apply");
        session.apply(EditAction::SetBody("b".to_string())).expect("apply");

        assert!(matches!(session.save().await, Err(AppError::Store(_))));
        assert_eq!(store.call_count(), 1);
        assert!(session.apply(EditAction::SetBody("still open".to_string())).is_ok());
    }

    #[test]
    fn date_format_falls_back_on_bad_pattern() {
        let at = Local.with_ymd_and_hms(2024, 1, 6, 15, 5, 0).single().expect("valid time");
        assert_eq!(
            format_date_time(at, crate::models::DEFAULT_DATE_TIME_FORMAT),
            "Saturday, 06 January 2024 03:05 PM"
        );
        assert_eq!(format_date_time(at, "%Q"), "Saturday, 06 January 2024 03:05 PM");
        assert_eq!(format_date_time(at, "%Y-%m-%d"), "2024-01-06");
    }
}
