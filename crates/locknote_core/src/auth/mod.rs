//! Biometric entry gate.
//!
//! # Responsibility
//! - Describe the platform biometric collaborator (`BiometricAuthenticator`).
//! - Drive the pre-entry state machine (`gate::BiometricGate`).
//!
//! # Invariants
//! - The core never evaluates biometric samples itself.
//! - Every authentication attempt resolves to exactly one `AuthOutcome`.

pub mod gate;

use async_trait::async_trait;

pub use gate::{BiometricGate, GateError, GateState};

pub const UNAVAILABLE_MESSAGE: &str = "Biometric authentication not available on this device";
pub const SUCCESS_MESSAGE: &str = "Authentication successful!";
pub const FAILED_MESSAGE: &str = "Authentication failed";

/// Platform capability check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricCapability {
    Available,
    NoHardware,
    /// Hardware exists but is busy or temporarily unusable.
    HardwareUnavailable,
    NoneEnrolled,
    LockedOut,
}

impl BiometricCapability {
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::NoHardware => "no_hardware",
            Self::HardwareUnavailable => "hardware_unavailable",
            Self::NoneEnrolled => "none_enrolled",
            Self::LockedOut => "locked_out",
        }
    }
}

/// Terminal result of one biometric prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    /// Recoverable condition reported by the platform (cancel, timeout, ...).
    Error(String),
    /// The sample was read but did not match.
    Failed,
}

impl AuthOutcome {
    /// Text shown to the user for this outcome.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Success => SUCCESS_MESSAGE,
            Self::Error(message) => message.as_str(),
            Self::Failed => FAILED_MESSAGE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error(_) => "error",
            Self::Failed => "failed",
        }
    }
}

/// Host-provided biometric prompt.
#[async_trait]
pub trait BiometricAuthenticator: Send + Sync {
    /// Synchronous hardware/enrollment/lockout check.
    fn capability(&self) -> BiometricCapability;

    fn can_authenticate(&self) -> bool {
        self.capability().is_available()
    }

    /// Shows the prompt and resolves once the user is done with it.
    async fn authenticate(&self) -> AuthOutcome;
}
