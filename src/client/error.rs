//! API client error types

use thiserror::Error;

use crate::session::StoreError;
use crate::upload::UploadError;

/// Errors that can occur when talking to the analysis API
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from the backend; the session has already been cleared
    #[error("Unauthorized")]
    Unauthorized,

    /// 401 from login or registration
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Any other non-success status, with the response body
    #[error("HTTP error! status: {status}, message: {message}")]
    Http { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    /// Could not connect to the backend
    #[error("Analysis service unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Body did not match the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Session storage error: {0}")]
    Session(#[from] StoreError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),
}

impl ApiError {
    /// Classify a reqwest failure the way the rest of the client expects
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Unavailable(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e)
        }
    }

    /// Whether demo mode may substitute canned data for this failure.
    ///
    /// Backend and network failures qualify; an expired session and local
    /// mistakes (bad files, bad configuration, storage) never do.
    pub fn is_fallback_eligible(&self) -> bool {
        match self {
            ApiError::Http { .. }
            | ApiError::Timeout
            | ApiError::Unavailable(_)
            | ApiError::Transport(_)
            | ApiError::Decode(_) => true,
            ApiError::Unauthorized
            | ApiError::InvalidCredentials
            | ApiError::InvalidBaseUrl(_)
            | ApiError::Session(_)
            | ApiError::Upload(_) => false,
        }
    }

    /// HTTP status, when the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Http {
            status: 422,
            message: "text is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error! status: 422, message: text is required"
        );
        assert_eq!(ApiError::Unauthorized.to_string(), "Unauthorized");
    }

    #[test]
    fn test_fallback_eligibility() {
        assert!(ApiError::Timeout.is_fallback_eligible());
        assert!(ApiError::Http {
            status: 500,
            message: String::new()
        }
        .is_fallback_eligible());
        assert!(!ApiError::Unauthorized.is_fallback_eligible());
        assert!(!ApiError::InvalidCredentials.is_fallback_eligible());
        assert!(!ApiError::Upload(UploadError::Empty).is_fallback_eligible());
    }

    #[test]
    fn test_status() {
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
        assert_eq!(ApiError::InvalidCredentials.status(), Some(401));
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(ApiError::Timeout.status(), None);
    }
}
