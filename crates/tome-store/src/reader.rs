//! File persistence and text extraction for uploaded documents.
//!
//! Uploads are validated against the configured extension allow-list before
//! any processing, saved under the storage directory with a timestamped
//! name, then converted to plain text for chunking.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::error::StoreError;

/// Reads uploaded files into plain text.
#[derive(Debug, Clone)]
pub struct DocumentReader {
    storage_dir: PathBuf,
    supported_types: Vec<String>,
}

impl DocumentReader {
    pub fn new(storage_dir: impl Into<PathBuf>, supported_types: Vec<String>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            supported_types,
        }
    }

    /// The configured extension allow-list.
    pub fn supported_types(&self) -> &[String] {
        &self.supported_types
    }

    /// Extract the lowercase extension from a filename, without the dot.
    pub fn extension(filename: &str) -> String {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default()
    }

    /// Reject filenames whose extension is not on the allow-list.
    pub fn validate_file_type(&self, filename: &str) -> Result<String, StoreError> {
        let extension = Self::extension(filename);
        if self.supported_types.iter().any(|t| t == &extension) {
            Ok(extension)
        } else {
            Err(StoreError::UnsupportedFileType {
                extension,
                supported: self.supported_types.join(", "),
            })
        }
    }

    /// Persist uploaded bytes under the storage directory.
    ///
    /// The saved name is prefixed with the upload time in milliseconds so
    /// repeated uploads of the same file never collide.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.storage_dir)?;

        let stored_name = format!("{}_{}", Utc::now().timestamp_millis(), filename);
        let path = self.storage_dir.join(stored_name);
        std::fs::write(&path, bytes)?;

        info!(path = %path.display(), "Uploaded file saved");
        Ok(path)
    }

    /// Extract plain text from a saved file based on its extension.
    pub fn extract_text(&self, path: &Path, extension: &str) -> Result<String, StoreError> {
        let text = match extension {
            "txt" | "md" => std::fs::read_to_string(path)?,
            "pdf" => pdf_extract::extract_text(path)
                .map_err(|e| StoreError::Extraction(format!("PDF extraction failed: {}", e)))?,
            other => {
                return Err(StoreError::UnsupportedFileType {
                    extension: other.to_string(),
                    supported: self.supported_types.join(", "),
                })
            }
        };

        if text.trim().is_empty() {
            return Err(StoreError::Extraction(
                "document produced no text content".to_string(),
            ));
        }

        Ok(text)
    }
}
