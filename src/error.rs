use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeterError {
    // IO-related errors
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to access directory: {path}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Data processing errors
    #[error("Failed to parse JSON: {context}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize metrics")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid quota: {message}")]
    InvalidQuota { message: String },

    // Environment-related errors
    #[error("Claude data directory not found")]
    ClaudePathNotFound,

    // Async processing
    #[error("Task failed")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed to configure thread pool")]
    ThreadPoolInit(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, MeterError>;
