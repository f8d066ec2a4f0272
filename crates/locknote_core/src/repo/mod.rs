//! Repository façade between view-models and the data access layer.
//!
//! # Responsibility
//! - Decouple presentation state holders from storage details.
//!
//! # Invariants
//! - Every call forwards to the DAO unchanged; no business logic lives here.

pub mod note_repo;

pub use note_repo::NoteRepository;
