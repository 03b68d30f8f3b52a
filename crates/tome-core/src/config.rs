use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TomeError};

/// Top-level configuration for the Tome service.
///
/// Loaded from `~/.tome/config.toml` by default. Each section corresponds
/// to a bounded context or cross-cutting concern. The generator API key is
/// deliberately absent: it comes from the `TOME_API_KEY` environment
/// variable only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomeConfig {
    pub general: GeneralConfig,
    pub memory: MemoryConfig,
    pub rag: RagConfig,
    pub documents: DocumentConfig,
    pub generator: GeneratorConfig,
    pub embedding: EmbeddingConfig,
}

impl Default for TomeConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            memory: MemoryConfig::default(),
            rag: RagConfig::default(),
            documents: DocumentConfig::default(),
            generator: GeneratorConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl TomeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| TomeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for uploaded documents.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// API server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.tome/data".to_string(),
            log_level: "info".to_string(),
            port: 3030,
        }
    }
}

/// Conversation memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Sliding-window bound: the most recent N messages kept per session.
    /// 20 messages is roughly 10 user/assistant exchanges.
    pub max_messages: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { max_messages: 20 }
    }
}

/// Retrieval settings shared by all RAG modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Default number of chunks retrieved for RAG prompts.
    pub top_k: usize,
    /// Minimum cosine similarity for a chunk to be returned at all.
    pub similarity_threshold: f64,
    /// Number of chunks fetched by the smart-chat routing probe.
    pub probe_top_k: usize,
    /// Number of chunks shown by the relevance-analysis diagnostic.
    pub analyze_top_k: usize,
    /// Hard cap on caller-supplied result counts.
    pub max_top_k: usize,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Chunks shorter than this are discarded.
    pub min_chunk_size: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.75,
            probe_top_k: 3,
            analyze_top_k: 10,
            max_top_k: 20,
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 5,
        }
    }
}

/// Document upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Directory where uploaded files are saved, relative to data_dir
    /// unless absolute.
    pub storage_dir: String,
    /// Allowed upload extensions. Files outside this list are rejected
    /// before any processing.
    pub supported_types: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            storage_dir: "documents".to_string(),
            supported_types: vec!["txt".to_string(), "md".to_string(), "pdf".to_string()],
        }
    }
}

/// Sampling parameters for one chat mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            max_tokens: 2048,
        }
    }
}

/// Language-model generator settings.
///
/// Plain chat favors a creative profile; RAG answers run cooler with a
/// larger output budget for quoting retrieved context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base URL of an OpenAI-compatible chat-completions API.
    pub base_url: String,
    /// Model name sent with every request.
    pub model: String,
    /// Sampling for plain (non-RAG) chat.
    pub chat: SamplingConfig,
    /// Sampling for RAG-augmented chat.
    pub rag: SamplingConfig,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            model: "qwen-plus".to_string(),
            chat: SamplingConfig {
                temperature: 0.7,
                top_p: 0.8,
                max_tokens: 2048,
            },
            rag: SamplingConfig {
                temperature: 0.3,
                top_p: 0.9,
                max_tokens: 3072,
            },
            timeout_secs: 60,
        }
    }
}

/// Embedding backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible embeddings API.
    pub base_url: String,
    /// Embedding model name.
    pub model: String,
    /// Vector dimensionality produced by the model.
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}
