//! Toolkit-free model of the note list screen.
//!
//! Keeps the snapshot currently on screen and turns each new snapshot into
//! row operations via `diff_notes`.

use super::{diff_notes, ListUpdate};
use crate::model::note::{Note, NoteId, NoteSnapshot};
use chrono::TimeZone;
use std::fmt::Display;
use std::sync::Arc;

/// Display projection of one list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub timestamp_label: String,
}

/// Rendered list state.
#[derive(Debug, Clone, Default)]
pub struct NoteListAdapter {
    notes: NoteSnapshot,
}

impl NoteListAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the shown snapshot and returns the row operations to apply.
    pub fn submit_list(&mut self, notes: NoteSnapshot) -> Vec<ListUpdate> {
        let updates = diff_notes(&self.notes, &notes);
        self.notes = notes;
        updates
    }

    pub fn notes(&self) -> NoteSnapshot {
        Arc::clone(&self.notes)
    }

    pub fn item(&self, position: usize) -> Option<&Note> {
        self.notes.get(position)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// `true` when the empty-state placeholder should replace the list.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Rows with timestamps rendered in `tz`.
    pub fn rows<Tz>(&self, tz: &Tz) -> Vec<NoteRow>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.notes
            .iter()
            .map(|note| NoteRow {
                id: note.id,
                title: note.title.clone(),
                content: note.content.clone(),
                timestamp_label: note
                    .display_timestamp(tz)
                    .unwrap_or_else(|| note.timestamp.to_string()),
            })
            .collect()
    }
}

/// Prompt shown before a note is deleted.
pub fn delete_confirmation(note: &Note) -> String {
    format!("Are you sure you want to delete \"{}\"?", note.title)
}
