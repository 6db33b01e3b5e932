//! Remote call error types

use std::time::Duration;

/// Errors that can occur during gateway calls.
///
/// The first group mirrors the error codes the pantry backend uses; the rest
/// are transport failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or invalid request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No authenticated user.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The acting user may not touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The target row or pantry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint would be violated (e.g. ingredient already in pantry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Backend failed for an unspecified reason.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl ApiError {
    /// Maps an HTTP status code and message onto the error taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            // No duration is reported by the server.
            408 | 504 => Self::Timeout(Duration::ZERO),
            _ => Self::Internal(message),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code that corresponds to this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::Timeout(_) => Some(408),
            Self::Internal(_) => Some(500),
            _ => None,
        }
    }

    /// Returns `true` if retrying the same interaction may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(ApiError::from_status(404, "gone"), ApiError::NotFound(m) if m == "gone"));
        assert!(matches!(ApiError::from_status(409, "dup"), ApiError::Conflict(_)));
        assert!(matches!(ApiError::from_status(504, ""), ApiError::Timeout(_)));
        assert!(matches!(ApiError::from_status(502, "bad gateway"), ApiError::Internal(_)));
    }

    #[test]
    fn test_status_code_round_trips_for_backend_codes() {
        for status in [400, 401, 403, 404, 409] {
            assert_eq!(ApiError::from_status(status, "x").status_code(), Some(status));
        }
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!ApiError::Conflict("dup".into()).is_retryable());
    }
}
