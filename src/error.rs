//! Error taxonomy shared by the session engine, quiz flow and profile store.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FocusError {
    /// The capture device refused access or is missing. Callers may retry.
    #[error("attention capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("validation failed: {0}")]
    Validation(String),

    /// A record points at a child that is not on the roster.
    #[error("reference to unknown child '{0}'")]
    StaleReference(String),

    #[error("a study session is already active")]
    SessionAlreadyActive,

    #[error("no active study session")]
    NoActiveSession,

    #[error("profile store unavailable: {0}")]
    StoreUnavailable(String),
}

impl FocusError {
    pub fn child_not_found(id: impl Into<String>) -> Self {
        FocusError::NotFound {
            kind: "child",
            id: id.into(),
        }
    }
}

pub type FocusResult<T> = Result<T, FocusError>;
