use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to load vector index at {path}: {reason}")]
    IndexLoad { path: String, reason: String },

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn index_load(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::IndexLoad { path: path.into(), reason: reason.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
