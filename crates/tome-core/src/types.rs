use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session id used when a caller supplies none.
///
/// A process-wide naming convention, not shared state: every component that
/// needs the fallback session refers to this constant.
pub const DEFAULT_SESSION_ID: &str = "default";

// =============================================================================
// Conversation types
// =============================================================================

/// The author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// A message sent by the caller.
    User,
    /// A reply produced by the model.
    Assistant,
}

impl ChatRole {
    /// The wire-format role string used by chat-completions APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message within a session. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a turn stamped with the current time.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Document types
// =============================================================================

/// Metadata attached to every stored chunk.
///
/// Chunks split from the same source document share the parent's metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Where the content came from: a filename, or "manual_input".
    pub source: String,
    /// Optional human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional category tag used for scoped retrieval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// File extension for uploaded documents ("txt", "md", "pdf").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// When the content entered the store.
    pub ingested_at: DateTime<Utc>,
}

impl DocumentMetadata {
    /// Metadata for text added directly through the API (no file).
    pub fn manual(title: Option<String>, category: Option<String>) -> Self {
        Self {
            source: "manual_input".to_string(),
            title,
            category,
            file_type: None,
            ingested_at: Utc::now(),
        }
    }

    /// Metadata for an uploaded file.
    pub fn uploaded(filename: &str, file_type: &str, category: Option<String>) -> Self {
        Self {
            source: filename.to_string(),
            title: None,
            category,
            file_type: Some(file_type.to_string()),
            ingested_at: Utc::now(),
        }
    }
}

/// A retrievable unit of content: one chunk of an ingested document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            metadata,
        }
    }

    /// A preview of the content capped at `max_chars`, with an ellipsis
    /// appended when truncated. Respects character boundaries.
    pub fn summary(&self, max_chars: usize) -> String {
        if self.content.chars().count() > max_chars {
            let truncated: String = self.content.chars().take(max_chars).collect();
            format!("{}...", truncated)
        } else {
            self.content.clone()
        }
    }
}

/// A document paired with its similarity score against a query.
///
/// Scores below the configured threshold never leave the store, so any
/// `ScoredDocument` a caller sees already passed the relevance bar.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f64,
}
