//! Entry flow: biometric gate first, then the note list.
//!
//! # Invariants
//! - A `NoteListViewModel` is only handed out behind an unlocked gate.

use crate::auth::{BiometricAuthenticator, BiometricGate, GateState};
use crate::dao::{DaoError, NoteDao};
use crate::repo::NoteRepository;
use crate::viewmodel::NoteListViewModel;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum SessionError {
    /// The gate has not reached `Unlocked`.
    Locked(GateState),
    Dao(DaoError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked(state) => write!(f, "notes are locked (gate state: {})", state.as_str()),
            Self::Dao(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dao(err) => Some(err),
            Self::Locked(_) => None,
        }
    }
}

impl From<DaoError> for SessionError {
    fn from(value: DaoError) -> Self {
        Self::Dao(value)
    }
}

/// Owns the repository shared by every screen of one app session.
pub struct NotesSession<D: NoteDao + 'static> {
    repo: Arc<NoteRepository<D>>,
}

impl<D: NoteDao + 'static> NotesSession<D> {
    pub fn new(dao: D) -> Self {
        Self {
            repo: Arc::new(NoteRepository::new(dao)),
        }
    }

    pub fn repository(&self) -> Arc<NoteRepository<D>> {
        Arc::clone(&self.repo)
    }

    /// Opens the note list if `gate` is unlocked.
    pub async fn enter<A: BiometricAuthenticator>(
        &self,
        gate: &BiometricGate<A>,
    ) -> Result<NoteListViewModel<D>, SessionError> {
        if !gate.is_unlocked() {
            warn!(
                "event=session_enter module=session status=locked state={}",
                gate.state().as_str()
            );
            return Err(SessionError::Locked(gate.state()));
        }

        let view_model = NoteListViewModel::new(self.repository()).await?;
        info!("event=session_enter module=session status=ok");
        Ok(view_model)
    }
}
