//! Error types for the document store.

use tome_core::error::TomeError;

/// Errors from the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("uploaded file is empty")]
    EmptyFile,
    #[error("document content cannot be empty")]
    EmptyContent,
    #[error("search query cannot be empty")]
    EmptyQuery,
    #[error("unsupported file type '{extension}', supported types: {supported}")]
    UnsupportedFileType {
        extension: String,
        supported: String,
    },
    #[error("failed to extract text from document: {0}")]
    Extraction(String),
    #[error("embedding service call failed: {0}")]
    Embedding(String),
    #[error("index error: {0}")]
    Index(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for TomeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyFile
            | StoreError::EmptyContent
            | StoreError::EmptyQuery
            | StoreError::UnsupportedFileType { .. } => TomeError::Validation(err.to_string()),
            other => TomeError::Store(other.to_string()),
        }
    }
}
