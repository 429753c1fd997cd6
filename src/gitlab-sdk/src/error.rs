/// Errors from the GitLab SDK
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// HTTP transport error (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// API answered with a status other than the expected one
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API, or the raw body
        message: String,
    },
    /// JSON deserialization error
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    /// The access token cannot be sent as a header value
    #[error("Invalid access token header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl SdkError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether repeating the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SdkError::Http(e) => !e.is_builder() && !e.is_decode(),
            SdkError::Api { status, .. } => *status == 429 || *status >= 500,
            SdkError::Deserialize(_) | SdkError::InvalidHeader(_) => false,
        }
    }
}
