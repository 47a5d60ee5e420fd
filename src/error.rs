//! Error types for the duel engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Illegal play: {0}")]
    IllegalPlay(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unknown play: {0}")]
    UnknownPlay(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DuelError>;
