//! Data access layer over the `notes` table.
//!
//! # Responsibility
//! - Define the asynchronous data access contract (`NoteDao`).
//! - Keep SQL and connection handling behind that contract.
//!
//! # Invariants
//! - Every query runs off the caller's async context.
//! - Missing rows are reported as `None`/`false`, never as errors.

pub mod note_dao;

pub use note_dao::{DaoError, DaoResult, NoteDao, SqliteNoteDao};
