//! Error types for the conversational layer.

use tome_core::error::TomeError;
use tome_store::StoreError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("service call failed: {0}")]
    Generation(String),
    #[error("document retrieval failed: {0}")]
    Retrieval(String),
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        ChatError::Retrieval(err.to_string())
    }
}

impl From<ChatError> for TomeError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => TomeError::Validation(err.to_string()),
            other => TomeError::Chat(other.to_string()),
        }
    }
}
