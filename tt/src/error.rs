//! Protocol error types

use sharedstore::StoreError;
use thiserror::Error;

use crate::console::ConsoleError;
use crate::session::SessionStatus;

/// Errors that can occur while running the coordination protocol
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Session full ({limit} connections)")]
    SessionFull { limit: usize },

    #[error("Session not accepting connections (status: {})", status_label(.status))]
    NotAccepting { status: Option<SessionStatus> },

    #[error("Name '{0}' is already connected")]
    NameTaken(String),

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Participant is already connected as '{0}'")]
    AlreadyConnected(String),

    #[error("Participant is not connected")]
    NotConnected,

    #[error("Corrupt value for key '{key}': {value:?}")]
    Corrupt { key: &'static str, value: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Console error: {0}")]
    Console(#[from] ConsoleError),
}

fn status_label(status: &Option<SessionStatus>) -> String {
    status.map(|s| s.to_string()).unwrap_or_else(|| "absent".to_string())
}

impl ProtocolError {
    /// Check if this error is a one-shot admission refusal
    pub fn is_admission_rejection(&self) -> bool {
        matches!(self, ProtocolError::SessionFull { .. } | ProtocolError::NotAccepting { .. })
    }

    /// Check if the operator left from the line editor (Ctrl+C or Ctrl+D)
    pub fn is_operator_exit(&self) -> bool {
        matches!(
            self,
            ProtocolError::Console(ConsoleError::Interrupted | ConsoleError::Closed)
        )
    }
}
