use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("The request failed after reaching the maximum number of retry attempts ({attempts}) on page {page}")]
    MaxIndeterminateRetries { page: u32, attempts: u32 },

    #[error("Maximum attempts ({attempts}) reached for solving the challenge on page {page}: {reason}")]
    MaxChallengeRetries {
        page: u32,
        attempts: u32,
        reason: String,
    },

    #[error("No data can be collected on page {page}")]
    NoData { page: u32 },

    #[error("Harvest cancelled")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Network-level failure of a single fetch, distinct from HTTP status errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl TransportError {
    pub(crate) fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Connect {
                url,
                reason: err.to_string(),
            }
        } else {
            Self::Request {
                url,
                reason: err.to_string(),
            }
        }
    }
}
