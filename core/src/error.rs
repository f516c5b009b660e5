use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("no corpus loaded")]
    CorpusNotLoaded,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported corpus format: {0}")]
    UnsupportedFormat(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;
