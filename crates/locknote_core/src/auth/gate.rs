//! Biometric gate state machine.
//!
//! ```text
//! Idle -> Checking -> Unavailable | Ready
//! Ready -> Authenticating -> Unlocked        (Success)
//!                         -> Ready           (Error / Failed)
//! ```
//!
//! # Invariants
//! - `authenticate` never reaches the platform unless the gate is `Ready`.
//! - Only `Success` leaves the `Ready`/`Authenticating` loop.

use super::{AuthOutcome, BiometricAuthenticator, BiometricCapability, UNAVAILABLE_MESSAGE};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Checking,
    /// Entry action disabled; carries the platform reason.
    Unavailable(BiometricCapability),
    Ready,
    Authenticating,
    Unlocked,
}

impl GateState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Unavailable(_) => "unavailable",
            Self::Ready => "ready",
            Self::Authenticating => "authenticating",
            Self::Unlocked => "unlocked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// `authenticate` was called outside `Ready`.
    NotReady(GateState),
}

impl Display for GateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady(GateState::Unavailable(_)) => write!(f, "{UNAVAILABLE_MESSAGE}"),
            Self::NotReady(state) => {
                write!(f, "biometric gate is not ready (state: {})", state.as_str())
            }
        }
    }
}

impl Error for GateError {}

/// Pre-entry gate in front of the note list.
pub struct BiometricGate<A: BiometricAuthenticator> {
    authenticator: A,
    state: GateState,
}

impl<A: BiometricAuthenticator> BiometricGate<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Whether the entry action should be enabled.
    pub fn is_ready(&self) -> bool {
        self.state == GateState::Ready
    }

    /// Message for the disabled entry action, if the gate is unavailable.
    pub fn unavailable_message(&self) -> Option<&'static str> {
        matches!(self.state, GateState::Unavailable(_)).then_some(UNAVAILABLE_MESSAGE)
    }

    /// Runs the synchronous capability check.
    ///
    /// Re-checking is allowed from `Idle` and `Unavailable`; other states are
    /// returned unchanged.
    pub fn check_capability(&mut self) -> GateState {
        if !matches!(self.state, GateState::Idle | GateState::Unavailable(_)) {
            return self.state;
        }

        self.state = GateState::Checking;
        let capability = self.authenticator.capability();
        self.state = if capability.is_available() && self.authenticator.can_authenticate() {
            GateState::Ready
        } else {
            GateState::Unavailable(capability)
        };

        match self.state {
            GateState::Unavailable(reason) => warn!(
                "event=biometric_check module=auth status=unavailable reason={}",
                reason.as_str()
            ),
            _ => info!("event=biometric_check module=auth status=ok"),
        }
        self.state
    }

    /// Prompts the user once and returns the single terminal outcome.
    pub async fn authenticate(&mut self) -> Result<AuthOutcome, GateError> {
        if self.state != GateState::Ready {
            warn!(
                "event=biometric_auth module=auth status=rejected state={}",
                self.state.as_str()
            );
            return Err(GateError::NotReady(self.state));
        }

        self.state = GateState::Authenticating;
        let outcome = self.authenticator.authenticate().await;
        self.state = match outcome {
            AuthOutcome::Success => GateState::Unlocked,
            AuthOutcome::Error(_) | AuthOutcome::Failed => GateState::Ready,
        };
        info!(
            "event=biometric_auth module=auth status={} state={}",
            outcome.as_str(),
            self.state.as_str()
        );
        Ok(outcome)
    }

    /// Locks the gate again, e.g. when the app goes to the background.
    pub fn lock(&mut self) {
        if self.state == GateState::Unlocked {
            self.state = GateState::Ready;
        }
    }
}
