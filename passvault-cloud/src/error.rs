//! Sync error types.
//!
//! Two layers: [`WebDavError`] describes what went wrong on the wire and is
//! what the storage client returns; [`CloudError`] is the taxonomy the sync
//! service reports to its caller.

use thiserror::Error;

/// Result type for WebDAV client operations.
pub type WebDavResult<T> = Result<T, WebDavError>;

/// Result type for sync service operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors from individual WebDAV requests.
#[derive(Debug, Error)]
pub enum WebDavError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },

    #[error("cleartext HTTP is not permitted for {0}")]
    CleartextNotPermitted(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WebDavError {
    /// HTTP status of a rejected request, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True if the resource does not exist on the server.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors surfaced by a sync attempt.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("cleartext HTTP traffic is not permitted")]
    CleartextNotPermitted,

    #[error("remote vault store is locked by another device")]
    FileIsLocked,

    #[error("sync failed: {0}")]
    Unknown(String),

    /// Failure reported by the merge callback, passed through unchanged.
    #[error(transparent)]
    Merge(#[from] anyhow::Error),
}

impl CloudError {
    /// True if the whole sync may simply be retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FileIsLocked)
    }
}

impl From<WebDavError> for CloudError {
    fn from(err: WebDavError) -> Self {
        match err {
            WebDavError::CleartextNotPermitted(_) => CloudError::CleartextNotPermitted,
            WebDavError::Status { .. } | WebDavError::Http(_) => {
                CloudError::Authentication(err.to_string())
            }
            WebDavError::InvalidRequest(_) | WebDavError::Serialization(_) => {
                CloudError::Unknown(err.to_string())
            }
        }
    }
}
