//! Failures reported by a `DataStore`.
//!
//! Stores return `anyhow::Error` wrapping a [`StoreError`]. Steps recover the
//! variant with [`as_store_error`] to tell a duplicate email apart from an
//! outage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. duplicate email).
    #[error("unique constraint violated: {message}")]
    UniqueViolation {
        constraint: Option<String>,
        message: String,
    },

    /// The store URL or access key is missing.
    #[error("store not configured: {0}")]
    NotConfigured(String),

    /// Authentication failed (invalid or expired key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response body could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl StoreError {
    /// Returns `true` if the store refused a write because of a duplicate key.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }

    /// Returns `true` if repeating the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { .. }
                | StoreError::NotConfigured(_)
                | StoreError::AuthenticationFailed(_)
        )
    }
}

/// Classify an error returned by a `DataStore` call.
pub fn as_store_error(err: &anyhow::Error) -> Option<&StoreError> {
    err.downcast_ref::<StoreError>()
}
