use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = i64;

pub const DEFAULT_DATE_TIME_FORMAT: &str = "%A, %d %B %Y %I:%M %p";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteColor {
    #[default]
    Charcoal,
    Amber,
    Coral,
    Indigo,
    Black,
}

impl NoteColor {
    pub const PALETTE: [NoteColor; 5] = [
        NoteColor::Charcoal,
        NoteColor::Amber,
        NoteColor::Coral,
        NoteColor::Indigo,
        NoteColor::Black,
    ];

    pub fn as_hex(self) -> &'static str {
        match self {
            Self::Charcoal => "#333333",
            Self::Amber => "#FDBE3B",
            Self::Coral => "#FF4842",
            Self::Indigo => "#3A52FC",
            Self::Black => "#000000",
        }
    }

    pub fn from_hex(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        Self::PALETTE
            .into_iter()
            .find(|color| color.as_hex()[1..].eq_ignore_ascii_case(digits))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Option<NoteId>,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub date_time: String,
    pub color: NoteColor,
    pub image_path: Option<String>,
    pub web_link: Option<String>,
}

impl Note {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn display_subtitle(&self) -> Option<&str> {
        if self.subtitle.trim().is_empty() {
            None
        } else {
            Some(self.subtitle.as_str())
        }
    }

    // `needle` must already be lowercased.
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        [&self.title, &self.subtitle, &self.body]
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "index")]
pub enum ListChange {
    InsertedAt(usize),
    RemovedAt(usize),
    ChangedAt(usize),
    FullReset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum QuickAction {
    Image(String),
    WebLink(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub request_id: Uuid,
    pub clicked_index: Option<usize>,
    pub note: Option<Note>,
    pub quick_action: Option<QuickAction>,
}

impl EditRequest {
    pub fn create(quick_action: Option<QuickAction>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            clicked_index: None,
            note: None,
            quick_action,
        }
    }

    pub fn open(clicked_index: usize, note: Note) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            clicked_index: Some(clicked_index),
            note: Some(note),
            quick_action: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "note")]
pub enum EditOutcome {
    Created(Note),
    Updated(Note),
    Deleted(Note),
    Canceled,
}

impl EditOutcome {
    pub fn was_update(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    pub request_id: Uuid,
    pub clicked_index: Option<usize>,
    pub outcome: EditOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub search_debounce_ms: u64,
    pub default_color: NoteColor,
    pub date_time_format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            default_color: NoteColor::default(),
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
        }
    }
}
