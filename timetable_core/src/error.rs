//! Error types for the timetable_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for timetable_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No study days were supplied, so no date could ever be scheduled
    #[error("At least one study day is required")]
    EmptyStudyDays,

    /// A topic carries a non-positive (or non-finite) hour estimate
    #[error("Topic '{topic}' has invalid hours: {hours}")]
    InvalidTopicHours { topic: String, hours: f64 },

    /// Effective session capacity is not a positive duration
    #[error("Invalid session capacity: {0} hours")]
    InvalidCapacity(f64),

    /// User-facing request validation failed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
