/// Build pipeline error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

/// Where to point users when no toolchain could be located.
pub const SETUP_DOCS: &str = "https://github.com/ingot-build/ingot/blob/main/docs/setup.md";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no {tool} binary found, tried: {tried}. See {SETUP_DOCS} for setup instructions")]
    ToolchainNotFound { tool: String, tried: String },

    #[error("failed to detect target triple: {0}")]
    ToolchainProbeFailed(String),

    #[error("unresolved symbols: {0}")]
    UnresolvedSymbols(String),

    #[error("IR {stage} stage failed: {detail}")]
    StageFailed { stage: &'static str, detail: String },

    #[error("failed to compile runtime source {path}: {detail}")]
    RuntimeCompileFailed { path: PathBuf, detail: String },

    #[error("failed to compile {path}: {detail}")]
    UnitCompileFailed { path: PathBuf, detail: String },

    #[error("native linking failed: {0}")]
    LinkFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error at {path}: {error}")]
    IoAt {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            error,
        }
    }

    /// Create a toolchain-not-found error listing every attempted binary name
    pub fn toolchain_not_found(tool: impl Into<String>, tried: &[String]) -> Self {
        Self::ToolchainNotFound {
            tool: tool.into(),
            tried: tried.join(", "),
        }
    }

    /// Create an unresolved-symbols error; symbol names are sorted and comma-joined
    pub fn unresolved(symbols: &[String]) -> Self {
        let mut sorted: Vec<&str> = symbols.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        Self::UnresolvedSymbols(sorted.join(", "))
    }

    /// Create a runtime source compile error
    pub fn runtime_compile(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::RuntimeCompileFailed {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    /// Create a compilation-unit compile error
    pub fn unit_compile(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::UnitCompileFailed {
            path: path.into(),
            detail: detail.to_string(),
        }
    }
}
