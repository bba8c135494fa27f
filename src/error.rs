use reqwest::StatusCode;

use crate::security::storage::StorageError;

/// Errors surfaced by the API client.
///
/// Nothing here is translated from the backend: a non-2xx answer keeps its
/// status and raw body, and network failures keep the underlying reqwest error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("credential storage: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status for `Status` errors, or the status reqwest attached to a
    /// transport error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Network(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
