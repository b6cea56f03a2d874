//! Error types for the posture pipeline
//!
//! Only configuration problems are errors. Missing landmarks surface as
//! undefined angles, and lifecycle events that do not apply are ignored.

use thiserror::Error;

/// Core errors
#[derive(Error, Debug)]
pub enum TaijiError {
    // Joint table errors
    #[error("Joint {joint}: landmark index {index} out of range (layout has {count})")]
    LandmarkOutOfRange {
        joint: String,
        index: usize,
        count: usize,
    },

    #[error("Joint {joint}: landmark index {index} used more than once")]
    RepeatedLandmark { joint: String, index: usize },

    #[error("Duplicate joint: {0}")]
    DuplicateJoint(String),

    #[error("Visibility threshold must be within [0, 1], got {0}")]
    InvalidVisibility(f64),

    // Tolerance errors
    #[error("Joint {joint}: invalid tolerance band (min {min}, ideal {ideal}, max {max})")]
    InvalidBand {
        joint: String,
        min: f64,
        ideal: f64,
        max: f64,
    },

    #[error("Duplicate tolerance band: {0}")]
    DuplicateBand(String),

    // Loading errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type TaijiResult<T> = Result<T, TaijiError>;
