//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical `Note` record mirrored by the `notes` table.
//! - Provide timestamp helpers used when notes are created or edited.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one and never changes afterwards.
//! - `timestamp` is Unix epoch milliseconds.
//! - Title/content emptiness is checked by `form::NoteForm`, not here.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;

/// Store-assigned note identifier (SQLite rowid).
pub type NoteId = i64;

/// Immutable ordered copy of the whole note collection.
///
/// Shared between every subscriber of one store change.
pub type NoteSnapshot = Arc<Vec<Note>>;

const DISPLAY_TIMESTAMP_FORMAT: &str = "%b %d, %Y at %H:%M";

/// Canonical persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// `None` for notes that were never inserted.
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds of creation or last edit.
    pub timestamp: i64,
}

impl Note {
    /// Creates an unsaved note stamped with the current time.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_timestamp(title, content, now_epoch_ms())
    }

    /// Creates an unsaved note with a caller-provided timestamp.
    pub fn with_timestamp(
        title: impl Into<String>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            timestamp,
        }
    }

    /// Returns a copy carrying the given store id.
    pub fn with_id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether this note was loaded from (or written to) the store.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Formats `timestamp` for list rows, e.g. `Mar 04, 2024 at 09:15`.
    ///
    /// Returns `None` when the timestamp is outside chrono's range.
    pub fn display_timestamp<Tz>(&self, tz: &Tz) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        format_timestamp(self.timestamp, tz)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Formats epoch milliseconds in the list display format for `tz`.
pub fn format_timestamp<Tz>(timestamp_ms: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_ms)?;
    Some(
        utc.with_timezone(tz)
            .format(DISPLAY_TIMESTAMP_FORMAT)
            .to_string(),
    )
}
