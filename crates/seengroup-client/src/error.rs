use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The gateway answered with a failure envelope.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Refused locally before any request was made.
    #[error("{0}")]
    Validation(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Operation not valid in the current sign-in state")]
    InvalidState,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Transport failures, timeouts and 5xx answers are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            ClientError::Timeout(_) => true,
            ClientError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
