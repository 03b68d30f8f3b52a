//! Tome document store - embedding service, vector index, chunking, and ingestion.
//!
//! Provides in-memory vector indexing with cosine similarity search and
//! metadata filtering, an embedding service trait with HTTP and mock
//! implementations, a character-window text splitter, file readers for the
//! supported upload formats, and the [`DocumentStore`] facade that ties them
//! together.

pub mod embedding;
pub mod error;
pub mod index;
pub mod reader;
pub mod splitter;
pub mod store;

pub use embedding::{DynEmbeddingService, EmbeddingService, HttpEmbeddingClient, MockEmbedding};
pub use error::StoreError;
pub use index::VectorIndex;
pub use reader::DocumentReader;
pub use splitter::TextSplitter;
pub use store::{CorpusStats, DocumentStore};
