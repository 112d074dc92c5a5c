use thiserror::Error;

/// Failure while building or serializing a document. Always reported as a
/// whole; no partial artifact is ever returned.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Malformed document model: {0}")]
    Malformed(String),

    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Word packaging failed: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generation worker failed: {0}")]
    Worker(String),
}

impl From<tokio::task::JoinError> for GenerationError {
    fn from(err: tokio::task::JoinError) -> Self {
        GenerationError::Worker(err.to_string())
    }
}
