use thiserror::Error;

use crate::modality::DetectorTier;

#[derive(Error, Debug)]
pub enum AtrustError {
    /// A tier prerequisite could not be initialized. Cached for the process lifetime.
    #[error("{tier} tier unavailable: {reason}")]
    Initialization { tier: DetectorTier, reason: String },

    /// The answering tier failed on one specific input.
    #[error("Scoring failed: {0}")]
    Scoring(String),

    /// Media could not be decoded.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Caller handed the engine something it can never process (wrong input kind, unknown key).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for AtrustError {
    fn from(e: serde_json::Error) -> Self {
        AtrustError::Serialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AtrustError>;
