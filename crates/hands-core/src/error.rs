use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the hands crates.
#[derive(Debug, Error)]
pub enum HandsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Wait(#[from] WaitError),

    #[error("{fields} missing in conversation info: {payload}")]
    MissingStatus { fields: String, payload: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Failures of the completion waiter. Both are fatal to the wait.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("Timeout: conversation did not complete within {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    #[error(
        "Aborting: {max_consecutive_errors} consecutive status check failures (last error: {last_error})"
    )]
    ErrorBudgetExceeded {
        max_consecutive_errors: u32,
        last_error: Box<HandsError>,
    },
}

pub type Result<T> = std::result::Result<T, HandsError>;
