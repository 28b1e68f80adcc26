//! Error types for civitai API operations.

use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors related to civitai API and asset requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request completed with a non-success HTTP status.
    #[error("invalid status code {status}: {url}")]
    InvalidStatusCode {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Transport failure outside the HTTP client (broken body stream, local
    /// write failure while streaming).
    #[error("Transport error: {0}")]
    Transport(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of an `InvalidStatusCode` error.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidStatusCode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is an `InvalidStatusCode` whose code is in `codes`.
    pub fn has_status_in(&self, codes: &[u16]) -> bool {
        self.status().is_some_and(|status| codes.contains(&status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_status_code_error_message() {
        let error = ApiError::InvalidStatusCode {
            status: 403,
            url: "https://civitai.com/api/download/models/1".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid status code 403"));
        assert!(msg.contains("civitai.com"));
    }

    #[test]
    fn test_status_accessor() {
        let error = ApiError::InvalidStatusCode {
            status: 404,
            url: String::new(),
        };
        assert_eq!(error.status(), Some(404));
        assert!(error.has_status_in(&[401, 403, 404]));
        assert!(!error.has_status_in(&[500]));

        let transport = ApiError::Transport("reset".to_string());
        assert_eq!(transport.status(), None);
        assert!(!transport.has_status_in(&[404]));
    }
}
