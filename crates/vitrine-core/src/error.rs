//! Error types for the Vitrine core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid landmark count: expected {expected}, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Landmark {index} has out-of-range coordinate {value}")]
    LandmarkCoordinate { index: usize, value: f64 },

    #[error("Invalid model label confidence: {0}")]
    LabelConfidence(f32),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
