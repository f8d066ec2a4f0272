//! Add/edit note form boundary.
//!
//! # Responsibility
//! - Validate user input before anything reaches the data layer.
//! - Build the note to insert or update from validated input.
//!
//! # Invariants
//! - Title and content are trimmed; both must be non-empty.
//! - Title is checked before content, matching the form's focus order.
//! - Edit mode keeps the note id and stamps the edit time.

use crate::model::note::{Note, NoteId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFormError {
    EmptyTitle,
    EmptyContent,
}

impl NoteFormError {
    /// Form field the error belongs to.
    pub fn field(self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::EmptyContent => "content",
        }
    }
}

impl Display for NoteFormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::EmptyContent => write!(f, "Content is required"),
        }
    }
}

impl Error for NoteFormError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(NoteId),
}

/// Raw form state as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub mode: FormMode,
    pub title: String,
    pub content: String,
}

impl NoteForm {
    /// Empty form for a new note.
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            title: String::new(),
            content: String::new(),
        }
    }

    /// Form prefilled from an existing note.
    ///
    /// Unsaved notes open in add mode.
    pub fn edit(note: &Note) -> Self {
        Self {
            mode: note.id.map_or(FormMode::Add, FormMode::Edit),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }

    pub fn screen_title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add Note",
            FormMode::Edit(_) => "Edit Note",
        }
    }

    /// Validates the input and builds the note to persist.
    pub fn into_note(self, now_epoch_ms: i64) -> Result<Note, NoteFormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(NoteFormError::EmptyTitle);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(NoteFormError::EmptyContent);
        }

        let note = Note::with_timestamp(title, content, now_epoch_ms);
        Ok(match self.mode {
            FormMode::Add => note,
            FormMode::Edit(id) => note.with_id(id),
        })
    }

    /// Confirmation shown once the save was dispatched.
    pub fn success_message(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Note added successfully",
            FormMode::Edit(_) => "Note updated successfully",
        }
    }
}
