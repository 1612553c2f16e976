// Error types for the fusion filter
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed input at line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("Required column missing from header: {0}")]
    MissingColumn(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("External filter {exe} exited with status {code:?}: {stderr}")]
    ExternalFailed {
        exe: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("Expected output file was not produced: {0:?}")]
    MissingOutput(PathBuf),
}
