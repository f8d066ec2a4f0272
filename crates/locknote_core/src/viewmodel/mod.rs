//! Presentation state holders.
//!
//! # Responsibility
//! - Hold observable state for views and turn user intents into async work.
//!
//! # Invariants
//! - Intents never block the caller.
//! - Work spawned by a view-model does not outlive its scope's cancellation.

pub mod note_list;

pub use note_list::{IntentOutcome, NoteListViewModel};
