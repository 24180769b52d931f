//! Error taxonomy shared by the feature pipeline, the business engine and the classifier adapter.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the churn pipeline.
/// Every operation either succeeds fully or returns one of these.
#[derive(Debug, Error)]
pub enum ChurnError {
    /// `transform` (or `snapshot`) called before a successful `fit`
    #[error("feature transformer has not been fitted")]
    NotFitted,

    /// `fit` called with no records
    #[error("cannot fit on an empty record set")]
    InsufficientData,

    /// Required field absent from a record
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// Field not part of the customer schema
    #[error("unexpected field: {field}")]
    UnexpectedField { field: String },

    /// Field present but with the wrong type or an out-of-range value
    #[error("invalid value for {field}: {reason}")]
    InvalidFieldValue { field: &'static str, reason: String },

    /// Categorical token never seen during fit
    #[error("unseen category for {field}: {value:?}")]
    UnseenCategory { field: String, value: String },

    /// Numeric column with zero (or non-finite) spread
    #[error("degenerate feature column {column}: standard deviation is {std_dev}")]
    DegenerateFeature { column: String, std_dev: f64 },

    /// Business engine or file configuration rejected
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Probability outside [0, 1] (or NaN)
    #[error("probability {value} at row {row} is outside [0, 1]")]
    InvalidProbability { row: usize, value: f64 },

    /// Records and probabilities of different lengths
    #[error("got {records} records but {probabilities} probabilities")]
    LengthMismatch { records: usize, probabilities: usize },

    /// Classifier has no model loaded
    #[error("classifier model not available at {}", .0.display())]
    ModelUnavailable(PathBuf),

    /// Classifier runtime failure
    #[error("inference failed: {0}")]
    Inference(String),

    /// Snapshot contents do not match the recorded fingerprint
    #[error("snapshot fingerprint mismatch: expected {expected}, got {actual}")]
    SnapshotIntegrity { expected: String, actual: String },

    /// Snapshot is well-formed JSON but not a usable fitted state
    #[error("incompatible snapshot: {0}")]
    IncompatibleSnapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChurnError>;
