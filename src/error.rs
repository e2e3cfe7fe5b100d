use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainlogError {
    #[error("Cannot read {path}: {reason}")]
    UnreadableInput { path: String, reason: String },

    #[error("No client headers found in {0} (is this an attendance sheet?)")]
    InvalidStructure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TrainlogError>;
