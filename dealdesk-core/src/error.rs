//! Error types for DealDesk

use thiserror::Error;

/// Failure reported by a collection backend.
///
/// These never escape the controller: a failed fetch marks the partition
/// errored and a failed delete clears the pending marker, and both are
/// surfaced to the render layer as events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Master error type for DealDesk domain operations.
#[derive(Debug, Clone, Error)]
pub enum DeskError {
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type alias for DealDesk operations.
pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = CollectionError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("503"));
        assert!(msg.contains("unavailable"));
    }

    #[test]
    fn test_collection_error_wraps_into_desk_error() {
        let err: DeskError = CollectionError::Transport("reset".to_string()).into();
        assert!(format!("{}", err).contains("reset"));
    }
}
