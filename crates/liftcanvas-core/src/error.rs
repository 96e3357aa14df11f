//! Engine error types

use thiserror::Error;

/// Canvas engine error type
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Card not found in the current canvas state
    #[error("card not found: {0}")]
    CardNotFound(String),

    /// Card has no group to act on
    #[error("card has no group id: {0}")]
    NoGroup(String),

    /// Store has been disposed; mutations are rejected
    #[error("canvas store disposed")]
    CanvasDisposed,

    /// Action is not valid for the targeted card
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Remote authority rejected or failed an action RPC
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// Streaming transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CanvasError {
    /// Whether the user should be offered a retry for this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, CanvasError::Dispatch(_) | CanvasError::Transport(_))
    }
}

impl From<anyhow::Error> for CanvasError {
    fn from(err: anyhow::Error) -> Self {
        CanvasError::Dispatch(err.to_string())
    }
}
