//! Error types for the annotation engine.
//!
//! The taxonomy mirrors how failures are handled: geometry errors are guarded
//! internally and never reach the operator, validation errors surface inline
//! before any network call, gateway errors surface as transient notifications
//! with the affected state left untouched, and stale references are handled by
//! skip-and-continue or explicit re-fetch.

/// Result type alias for annotation engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while annotating a paper.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Degenerate geometric operation (zero-area selection, empty union)
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Operator input rejected before any persistence attempt
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend call failed (network failure, non-success status, bad payload)
    #[error("Gateway error during {operation}: {reason}")]
    Gateway {
        /// The gateway operation that failed
        operation: String,
        /// Reason reported by the backend or transport
        reason: String,
    },

    /// A server ref or block id no longer resolves
    #[error("Stale reference: {0}")]
    StaleReference(String),

    /// Content payload could not be serialized or parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a gateway failure on a named operation.
    pub fn gateway(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Gateway {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// True for errors the operator should see inline on the form.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = Error::Validation("only one cover page can be saved".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Validation error"));
        assert!(msg.contains("cover page"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_gateway_error_message() {
        let err = Error::gateway("create_region", "HTTP 502");
        let msg = format!("{}", err);
        assert!(msg.contains("create_region"));
        assert!(msg.contains("HTTP 502"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_stale_reference_message() {
        let err = Error::StaleReference("region 42 no longer exists".to_string());
        assert!(format!("{}", err).contains("region 42"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
