use thiserror::Error;

/// Errors that can occur when communicating with the Admin API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Admin API returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Incomplete authentication: {0}")]
    Auth(String),
}

impl ApiError {
    /// Classify a transport error, separating unreachable servers from other failures.
    pub(crate) fn from_transport(err: reqwest::Error, base_url: &str) -> Self {
        if err.is_connect() {
            ApiError::Connection(format!("Cannot connect to {base_url}"))
        } else if err.is_timeout() {
            ApiError::Connection(format!("Request to {base_url} timed out"))
        } else {
            ApiError::Request(err)
        }
    }
}
