use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to prepare report directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report file: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to serialize report entry: {0}")]
    Serialize(#[from] serde_json::Error),
}
