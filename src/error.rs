use thiserror::Error;

#[derive(Debug, Error)]
pub enum NemoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed accelerator record on line {line}: expected 3 fields, got {fields}")]
    MalformedRecord { line: usize, fields: usize },

    #[error("Invalid escape in field {field} on line {line}")]
    Decode { line: usize, field: usize },

    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, NemoError>;
