use crate::syntax::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CddaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("File discovery error: {0}")]
    Walk(#[from] ignore::Error),
    #[error("Parsing error: {0}")]
    Parse(#[from] ParseError),
    #[error("Manifest error in {manifest}: {reason}")]
    Manifest { manifest: String, reason: String },
    #[error("Invalid document URI: {0}")]
    InvalidUri(String),
    #[error("Document not open: {0}")]
    DocumentNotOpen(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CddaError {
    pub fn manifest(manifest: impl ToString, reason: impl ToString) -> Self {
        CddaError::Manifest {
            manifest: manifest.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CddaError>;
