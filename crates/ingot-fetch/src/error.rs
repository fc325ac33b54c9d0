/// Tool acquisition error types
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("tool '{0}' not found in the tools manifest")]
    ToolNotFound(String),

    #[error("invalid coordinates '{0}', expected group:name:version")]
    InvalidCoordinates(String),

    #[error("failed to parse {what}: {detail}")]
    ParseError { what: String, detail: String },

    #[error("artifact {0} not found in any configured repository")]
    ArtifactNotFound(String),

    #[error("checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Create a parse error with context
    pub fn parse(what: impl Into<String>, detail: impl ToString) -> Self {
        Self::ParseError {
            what: what.into(),
            detail: detail.to_string(),
        }
    }
}
