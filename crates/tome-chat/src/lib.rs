//! Conversational layer for Tome.
//!
//! Provides per-session conversation memory with a sliding window, the
//! response-generator abstraction over a chat-completions API, and the
//! orchestrator that routes each request through plain, RAG,
//! category-scoped, or automatic chat.

pub mod error;
pub mod generator;
pub mod memory;
pub mod orchestrator;

pub use error::ChatError;
pub use generator::{
    ChatCompletionsClient, FailingGenerator, GenerationOptions, MockGenerator, ResponseGenerator,
};
pub use memory::ConversationMemory;
pub use orchestrator::{ChatOrchestrator, ChatSettings};
