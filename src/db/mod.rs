use crate::errors::{AppError, AppResult};
use crate::models::{AppSettings, Note, NoteColor, NoteId};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Store(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        let db = Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        };
        db.ensure_default_settings()?;

        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    pub fn insert_or_replace_note(&self, note: &Note) -> AppResult<Note> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO notes (id, title, subtitle, note_text, date_time, color, image_path, web_link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                note.id,
                note.title,
                note.subtitle,
                note.body,
                note.date_time,
                note.color.as_hex(),
                note.image_path,
                note.web_link,
            ],
        )?;

        let id = note.id.unwrap_or_else(|| conn.last_insert_rowid());
        Ok(Note {
            id: Some(id),
            ..note.clone()
        })
    }

    pub fn list_notes(&self) -> AppResult<Vec<Note>> {
        let conn = self.lock()?;
        let mut statement = conn.prepare(
            "SELECT id, title, subtitle, note_text, date_time, color, image_path, web_link
             FROM notes ORDER BY id DESC",
        )?;

        let notes = statement
            .query_map([], parse_note_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    #[cfg(test)]
    pub fn get_note(&self, id: NoteId) -> AppResult<Option<Note>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, title, subtitle, note_text, date_time, color, image_path, web_link
             FROM notes WHERE id = ?1",
            [id],
            parse_note_row,
        )
        .optional()
        .map_err(AppError::from)
    }

    pub fn delete_note(&self, id: NoteId) -> AppResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = 'app'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(serde_json::from_str::<AppSettings>(&raw).unwrap_or_else(|error| {
                tracing::warn!(error = %error, "stored settings unreadable, using defaults");
                AppSettings::default()
            })),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: AppSettings = serde_json::from_value(merged)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO settings (key, value_json, updated_at)
             VALUES ('app', ?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![serde_json::to_string(&settings)?, Utc::now().to_rfc3339()],
        )?;

        Ok(settings)
    }

    fn ensure_default_settings(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value_json, updated_at) VALUES ('app', ?1, ?2)",
            params![
                serde_json::to_string(&AppSettings::default())?,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }
}

fn parse_note_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let color_raw: String = row.get(5)?;
    Ok(Note {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        subtitle: row.get(2)?,
        body: row.get(3)?,
        date_time: row.get(4)?,
        color: NoteColor::from_hex(&color_raw).unwrap_or_default(),
        image_path: non_blank(row.get(6)?),
        web_link: non_blank(row.get(7)?),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}
