//! Core domain logic for LockNote.
//! This crate owns note persistence, live note observation, list diffing and
//! the biometric entry gate.

pub mod auth;
pub mod config;
pub mod dao;
pub mod db;
pub mod diff;
pub mod form;
pub mod logging;
pub mod model;
pub mod observe;
pub mod repo;
pub mod session;
pub mod viewmodel;

pub use auth::{
    AuthOutcome, BiometricAuthenticator, BiometricCapability, BiometricGate, GateError, GateState,
};
pub use config::{open_store, CoreConfig};
pub use dao::{DaoError, DaoResult, NoteDao, SqliteNoteDao};
pub use diff::adapter::{delete_confirmation, NoteListAdapter, NoteRow};
pub use diff::{apply_updates, diff_notes, ListUpdate};
pub use form::{FormMode, NoteForm, NoteFormError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{now_epoch_ms, Note, NoteId, NoteSnapshot};
pub use observe::{NotesObserver, NotesSubscription, SubscriptionId};
pub use repo::NoteRepository;
pub use session::{NotesSession, SessionError};
pub use viewmodel::{IntentOutcome, NoteListViewModel};

/// Minimal health-check API for smoke probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
