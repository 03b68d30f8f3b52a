use thiserror::Error;

/// Top-level error type for the Tome system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define their
/// own error types and implement `From<SubsystemError> for TomeError` so
/// that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TomeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TomeError {
    fn from(err: toml::de::Error) -> Self {
        TomeError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TomeError {
    fn from(err: toml::ser::Error) -> Self {
        TomeError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TomeError {
    fn from(err: serde_json::Error) -> Self {
        TomeError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Tome operations.
pub type Result<T> = std::result::Result<T, TomeError>;
