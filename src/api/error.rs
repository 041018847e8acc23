/// Errors from calls to the clinic backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Cannot connect to backend at {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    ResponseParsing(String),
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl ApiError {
    /// Backend rejected the credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}
