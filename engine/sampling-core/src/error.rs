//! Errors raised by collaborator contracts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown outcome class: {0}")]
    UnknownOutcome(String),

    #[error("Path volume must be positive, got {0}")]
    InvalidPathVolume(i64),
}
