//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the single record shape stored by the core.
//! - Provide clock and display helpers shared by the form and list layers.
//!
//! # Invariants
//! - A persisted note is identified by a store-assigned `NoteId`.
//! - Snapshots handed to observers are immutable and cheap to clone.

pub mod note;
