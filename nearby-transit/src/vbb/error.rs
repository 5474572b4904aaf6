//! Transit API error types.

/// Errors that can occur when talking to the transit API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error {status}: {status_text}")]
    Status { status: u16, status_text: String },

    /// Response body was not valid JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Response was JSON but not the expected shape
    #[error("Invalid API response format")]
    InvalidFormat,

    /// Could not build the request URL
    #[error("invalid URL: {0}")]
    Url(String),
}

impl ApiError {
    /// Build a status error from a reqwest status code.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}
