//! Errors raised while building a status record.

use thiserror::Error;

/// Errors from parsing a status document
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Malformed status document: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Missing timestamp field: {field}")]
    MissingTimestamp { field: &'static str },

    #[error("Malformed timestamp in {field}: {value:?}")]
    MalformedTimestamp { field: &'static str, value: String },

    #[error("Unknown runtime status: {0}")]
    UnknownRuntimeStatus(String),
}

impl StatusError {
    /// Check if this error came from the creation or last-updated timestamps
    pub fn is_timestamp_error(&self) -> bool {
        matches!(
            self,
            StatusError::MissingTimestamp { .. } | StatusError::MalformedTimestamp { .. }
        )
    }
}
