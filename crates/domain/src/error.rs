//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`TapoError`]
//! via `#[from]`.

use std::time::Duration;

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum TapoError {
    #[error("vendor API error")]
    Api(#[from] ApiError),
}

/// Failures reported by a vendor API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The hub rejected the stored credentials.
    #[error("authentication rejected by the hub")]
    Unauthorized,

    /// Network or transport level failure.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    /// Whether this error represents an expired deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
