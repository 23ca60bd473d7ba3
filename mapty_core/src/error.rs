//! Error types for the mapty_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons the position service can fail to produce coordinates
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    /// The host has no position service at all
    #[error("geolocation is not supported")]
    Unsupported,
}

/// Core error type for mapty_core operations
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

    /// Form input failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Form type field is neither running nor cycling
    #[error("Unknown workout type: {0:?}")]
    UnknownWorkoutType(String),

    /// Operation needs the map but it was never loaded
    #[error("Map is not loaded")]
    MapNotLoaded,

    /// A form was submitted before any map click
    #[error("No map position selected for the workout")]
    NoPendingClick,

    /// No workout with the given id
    #[error("Workout not found: {0}")]
    WorkoutNotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
