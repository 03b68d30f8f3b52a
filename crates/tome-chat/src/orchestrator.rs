//! Chat orchestrator: routes each request through plain, RAG,
//! category-scoped, or automatic chat, sharing one memory substrate.
//!
//! The store and generator are injected at construction; the orchestrator
//! owns only the routing policy, prompt assembly, and the rule that turns
//! are recorded after a successful generation, never before.

use std::sync::Arc;

use tracing::{debug, error, warn};

use tome_core::config::TomeConfig;
use tome_core::types::{ChatRole, ChatTurn, ScoredDocument};
use tome_store::DocumentStore;

use crate::error::ChatError;
use crate::generator::{GenerationOptions, ResponseGenerator};
use crate::memory::ConversationMemory;

/// System prompt for plain conversation.
const PLAIN_SYSTEM_PROMPT: &str = "You are a knowledgeable assistant. Answer accurately and \
concisely. When context is provided, prefer it over your own knowledge; when it is \
insufficient, say so and supplement carefully. If you cannot determine an answer, be honest \
about it.";

/// System prompt for retrieval-grounded conversation.
const RAG_SYSTEM_PROMPT: &str = "You are an assistant answering strictly from the provided \
knowledge-base context. If the context does not contain the information needed, state \
explicitly that the knowledge base has no answer.";

/// Last-resort reply when even the plain-chat fallback fails.
const DEGRADED_REPLY: &str =
    "The assistant is temporarily unavailable. Please try again in a moment.";

/// Per-mode options and retrieval depths, resolved once from config.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub chat_options: GenerationOptions,
    pub rag_options: GenerationOptions,
    pub top_k: usize,
    pub probe_top_k: usize,
    pub analyze_top_k: usize,
}

impl ChatSettings {
    pub fn from_config(config: &TomeConfig) -> Self {
        Self {
            chat_options: GenerationOptions::from_sampling(
                &config.generator.model,
                &config.generator.chat,
            ),
            rag_options: GenerationOptions::from_sampling(
                &config.generator.model,
                &config.generator.rag,
            ),
            top_k: config.rag.top_k,
            probe_top_k: config.rag.probe_top_k,
            analyze_top_k: config.rag.analyze_top_k,
        }
    }
}

/// Central coordinator for all chat modes.
pub struct ChatOrchestrator {
    store: Arc<DocumentStore>,
    generator: Box<dyn ResponseGenerator>,
    memory: ConversationMemory,
    settings: ChatSettings,
}

impl ChatOrchestrator {
    /// Create an orchestrator with injected store and generator.
    pub fn new(
        store: Arc<DocumentStore>,
        generator: Box<dyn ResponseGenerator>,
        config: &TomeConfig,
    ) -> Self {
        Self {
            store,
            generator,
            memory: ConversationMemory::new(config.memory.max_messages),
            settings: ChatSettings::from_config(config),
        }
    }

    /// Plain chat: message plus session memory, no retrieval.
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        debug!(session_id, "Plain chat message received");

        self.generate_and_record(
            session_id,
            message,
            message,
            PLAIN_SYSTEM_PROMPT,
            &self.settings.chat_options,
        )
        .await
    }

    /// RAG chat: retrieve from the full corpus, generate with the retrieved
    /// context. When retrieval comes back empty the generator is still
    /// invoked and the model answers from its own knowledge.
    pub async fn chat_with_rag(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        debug!(session_id, "RAG chat message received");

        let documents = self
            .store
            .search(message, self.settings.top_k)
            .await
            .map_err(|e| {
                error!(session_id, "RAG retrieval failed: {}", e);
                ChatError::from(e)
            })?;

        let prompt = if documents.is_empty() {
            debug!(session_id, "No documents retrieved, generator answers unaided");
            message.to_string()
        } else {
            build_context_prompt(message, &documents)
        };

        self.generate_and_record(
            session_id,
            message,
            &prompt,
            RAG_SYSTEM_PROMPT,
            &self.settings.rag_options,
        )
        .await
    }

    /// Category-scoped RAG chat.
    ///
    /// When the filtered retrieval is empty this short-circuits: a fixed
    /// informational reply, no generator call, no memory mutation.
    pub async fn chat_with_rag_by_category(
        &self,
        session_id: &str,
        message: &str,
        category: &str,
    ) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        debug!(session_id, category, "Category RAG message received");

        let documents = self
            .store
            .search_by_category(message, category, self.settings.top_k)
            .await
            .map_err(|e| {
                error!(session_id, category, "Category retrieval failed: {}", e);
                ChatError::from(e)
            })?;

        if documents.is_empty() {
            return Ok(format!(
                "No documents found in category '{}' related to your question. \
                 Try rephrasing it or choosing a different category.",
                category
            ));
        }

        let prompt = build_context_prompt(message, &documents);
        self.generate_and_record(
            session_id,
            message,
            &prompt,
            RAG_SYSTEM_PROMPT,
            &self.settings.rag_options,
        )
        .await
    }

    /// Automatic routing: a small retrieval probe decides between RAG and
    /// plain chat. Any failure along the way degrades to plain chat, and a
    /// failure of that last resort produces a fixed reply; only an empty
    /// message is ever reported as an error.
    pub async fn smart_chat(&self, session_id: &str, message: &str) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        match self.store.search(message, self.settings.probe_top_k).await {
            Ok(hits) if !hits.is_empty() => {
                debug!(session_id, hits = hits.len(), "Probe hit, routing to RAG");
                match self.chat_with_rag(session_id, message).await {
                    Ok(reply) => Ok(reply),
                    Err(e) => {
                        warn!(session_id, "RAG mode failed, degrading to plain chat: {}", e);
                        Ok(self.plain_chat_fallback(session_id, message).await)
                    }
                }
            }
            Ok(_) => {
                debug!(session_id, "Probe found nothing, routing to plain chat");
                Ok(self.plain_chat_fallback(session_id, message).await)
            }
            Err(e) => {
                warn!(session_id, "Probe failed, degrading to plain chat: {}", e);
                Ok(self.plain_chat_fallback(session_id, message).await)
            }
        }
    }

    /// Ranked human-readable summary of what the corpus knows about a query.
    /// Diagnostic only: no generator call.
    pub async fn analyze_document_relevance(&self, query: &str) -> Result<String, ChatError> {
        let documents = self
            .store
            .search(query, self.settings.analyze_top_k)
            .await?;

        if documents.is_empty() {
            return Ok("No documents relevant to the query were found.".to_string());
        }

        let mut analysis = format!("Found {} relevant documents:\n\n", documents.len());
        for (i, scored) in documents.iter().enumerate() {
            let meta = &scored.document.metadata;
            analysis.push_str(&format!("{}. source: {}", i + 1, meta.source));
            if let Some(ref category) = meta.category {
                analysis.push_str(&format!(" | category: {}", category));
            }
            analysis.push_str(&format!(" | score: {:.3}", scored.score));
            analysis.push_str(&format!("\n   preview: {}\n\n", scored.document.summary(200)));
        }

        Ok(analysis)
    }

    /// Discard a session's history.
    pub fn start_new_conversation(&self, session_id: &str) {
        debug!(session_id, "Starting new conversation");
        self.memory.clear(session_id);
    }

    /// A session's turns, oldest first.
    pub fn conversation_history(&self, session_id: &str) -> Vec<ChatTurn> {
        self.memory.get(session_id)
    }

    /// One-line summary of a session's extent.
    pub fn session_info(&self, session_id: &str) -> String {
        let count = self.memory.len(session_id);
        format!(
            "Session: {}, messages: {}, exchanges: {}",
            session_id,
            count,
            count / 2
        )
    }

    /// Textual status report assembled from corpus statistics.
    pub fn system_status(&self) -> String {
        let stats = self.store.stats();

        let mut status = String::from("=== RAG system status ===\n");
        status.push_str(&format!("Total documents: {}\n", stats.total_documents));
        status.push_str(&format!(
            "Supported file types: {}\n",
            stats.supported_file_types.join(", ")
        ));
        if !stats.categories.is_empty() {
            status.push_str("Document categories:\n");
            let mut categories: Vec<_> = stats.categories.iter().collect();
            categories.sort();
            for (category, count) in categories {
                status.push_str(&format!("  - {}: {} documents\n", category, count));
            }
        }
        status.push_str("Retrieval: enabled\n");
        status.push_str("Vector store: in-memory cosine index");
        status
    }

    // -- Private helpers --

    /// Run the generator with session context and, on success only, record
    /// the user and assistant turns.
    async fn generate_and_record(
        &self,
        session_id: &str,
        user_message: &str,
        prompt: &str,
        system_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ChatError> {
        let history = self.memory.get(session_id);

        let reply = self
            .generator
            .generate(system_prompt, &history, prompt, options)
            .await
            .map_err(|e| {
                error!(session_id, "Generation failed: {}", e);
                e
            })?;

        self.memory.append(session_id, ChatRole::User, user_message);
        self.memory.append(session_id, ChatRole::Assistant, &reply);

        debug!(session_id, reply_len = reply.len(), "Reply recorded");
        Ok(reply)
    }

    /// Plain chat that swallows its own failure, returning a fixed reply
    /// instead. Used only by smart_chat's fail-open path.
    async fn plain_chat_fallback(&self, session_id: &str, message: &str) -> String {
        match self.chat(session_id, message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(session_id, "Plain-chat fallback failed: {}", e);
                DEGRADED_REPLY.to_string()
            }
        }
    }
}

/// Format retrieved documents and the question into one grounded prompt.
fn build_context_prompt(message: &str, documents: &[ScoredDocument]) -> String {
    let mut prompt = String::from("Answer the question using the reference documents below.\n\n");
    prompt.push_str("=== Reference documents ===\n");
    for (i, scored) in documents.iter().enumerate() {
        let meta = &scored.document.metadata;
        prompt.push_str(&format!("Document {} (source: {}", i + 1, meta.source));
        if let Some(ref category) = meta.category {
            prompt.push_str(&format!(", category: {}", category));
        }
        prompt.push_str("):\n");
        prompt.push_str(&scored.document.content);
        prompt.push_str("\n\n");
    }
    prompt.push_str("=== Question ===\n");
    prompt.push_str(message);
    prompt.push_str(
        "\n\nAnswer based on the documents above. If they do not contain the information \
         needed, say that the provided documents have no answer.",
    );
    prompt
}
