//! The document store facade: ingest, search, stats, clear.
//!
//! Chains the reader, splitter, embedding service, and vector index into the
//! operations the chat layer and the REST surface consume. Retrieval
//! thresholds and result caps live here so callers never re-filter.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tome_core::config::RagConfig;
use tome_core::types::{Document, DocumentMetadata, ScoredDocument};

use crate::embedding::DynEmbeddingService;
use crate::error::StoreError;
use crate::index::VectorIndex;
use crate::reader::DocumentReader;
use crate::splitter::TextSplitter;

/// Corpus-level statistics for the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub categories: HashMap<String, usize>,
    pub supported_file_types: Vec<String>,
}

/// Vectorized document corpus with similarity search.
///
/// Uses dynamic dispatch for the embedder so production code can supply
/// the HTTP client while tests use `MockEmbedding`.
pub struct DocumentStore {
    index: VectorIndex,
    embedder: Box<dyn DynEmbeddingService>,
    splitter: TextSplitter,
    reader: DocumentReader,
    similarity_threshold: f64,
    max_top_k: usize,
}

impl DocumentStore {
    /// Create a store from an embedding backend, a file reader, and the
    /// retrieval settings.
    pub fn new(
        embedder: Box<dyn DynEmbeddingService>,
        reader: DocumentReader,
        rag: &RagConfig,
    ) -> Self {
        Self {
            index: VectorIndex::new(),
            embedder,
            splitter: TextSplitter::new(rag.chunk_size, rag.chunk_overlap, rag.min_chunk_size),
            reader,
            similarity_threshold: rag.similarity_threshold,
            max_top_k: rag.max_top_k,
        }
    }

    /// Add a document from raw text, returning the number of stored chunks.
    pub async fn add_text(
        &self,
        content: &str,
        title: Option<String>,
        category: Option<String>,
    ) -> Result<usize, StoreError> {
        if content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let metadata = DocumentMetadata::manual(title.clone(), category);
        let count = self.index_chunks(content, metadata).await?;

        info!(
            title = title.as_deref().unwrap_or("untitled"),
            chunks = count,
            "Text document added"
        );
        Ok(count)
    }

    /// Save, parse, split, and index an uploaded file.
    ///
    /// Validation (non-empty file, allowed extension) happens before any
    /// file is written or any external call is made.
    pub async fn ingest_file(
        &self,
        filename: &str,
        bytes: &[u8],
        category: Option<String>,
    ) -> Result<usize, StoreError> {
        if bytes.is_empty() {
            return Err(StoreError::EmptyFile);
        }
        let extension = self.reader.validate_file_type(filename)?;

        let path = self.reader.save(filename, bytes)?;
        let text = self.reader.extract_text(&path, &extension)?;

        let metadata = DocumentMetadata::uploaded(filename, &extension, category);
        let count = self.index_chunks(&text, metadata).await?;

        info!(filename, chunks = count, "Document ingested");
        Ok(count)
    }

    /// Search the full corpus.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        self.search_inner(query, max_results, None).await
    }

    /// Search only documents tagged with the given category.
    pub async fn search_by_category(
        &self,
        query: &str,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        self.search_inner(query, max_results, Some(category)).await
    }

    /// Corpus statistics: chunk count, category breakdown, allowed types.
    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            total_documents: self.index.len(),
            categories: self.index.category_counts(),
            supported_file_types: self.reader.supported_types().to_vec(),
        }
    }

    /// Remove every stored chunk, returning how many were removed.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        let removed = self.index.clear()?;
        info!(removed, "Document store cleared");
        Ok(removed)
    }

    /// The configured extension allow-list.
    pub fn supported_types(&self) -> &[String] {
        self.reader.supported_types()
    }

    // -- Private helpers --

    async fn search_inner(
        &self,
        query: &str,
        max_results: usize,
        category: Option<&str>,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        if query.trim().is_empty() {
            return Err(StoreError::EmptyQuery);
        }

        let top_k = max_results.clamp(1, self.max_top_k);
        let query_vec = self.embedder.embed_boxed(query).await?;
        let results = self
            .index
            .search(&query_vec, top_k, self.similarity_threshold, category)?;

        debug!(
            query,
            category = category.unwrap_or("*"),
            hits = results.len(),
            "Search completed"
        );
        Ok(results)
    }

    async fn index_chunks(
        &self,
        text: &str,
        metadata: DocumentMetadata,
    ) -> Result<usize, StoreError> {
        let chunks = self.splitter.split(text);
        if chunks.is_empty() {
            return Err(StoreError::Extraction(
                "document produced no indexable chunks".to_string(),
            ));
        }

        for chunk in &chunks {
            let embedding = self.embedder.embed_boxed(chunk).await?;
            self.index
                .insert(Document::new(chunk.clone(), metadata.clone()), embedding)?;
        }

        Ok(chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbedding;

    fn make_store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let reader = DocumentReader::new(
            dir.path(),
            vec!["txt".to_string(), "md".to_string(), "pdf".to_string()],
        );
        // Mock vectors only match identical text, so use a zero threshold
        // except where a test exercises the threshold itself.
        let rag = RagConfig {
            similarity_threshold: 0.0,
            ..RagConfig::default()
        };
        let store = DocumentStore::new(Box::new(MockEmbedding::new()), reader, &rag);
        (dir, store)
    }

    #[tokio::test]
    async fn test_add_text_stores_chunks() {
        let (_dir, store) = make_store();
        let count = store
            .add_text("the vacation policy allows 25 days", None, None)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.stats().total_documents, 1);
    }

    #[tokio::test]
    async fn test_add_text_empty_content_rejected() {
        let (_dir, store) = make_store();
        let err = store.add_text("   ", None, None).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyContent));
        assert_eq!(store.stats().total_documents, 0);
    }

    #[tokio::test]
    async fn test_add_long_text_produces_multiple_chunks() {
        let (_dir, store) = make_store();
        let text = "sentence about the handbook. ".repeat(100); // ~2900 chars
        let count = store.add_text(&text, None, None).await.unwrap();
        assert!(count > 1);
        assert_eq!(store.stats().total_documents, count);
    }

    #[tokio::test]
    async fn test_duplicate_ingestion_duplicates_chunks() {
        let (_dir, store) = make_store();
        store.add_text("identical content", None, None).await.unwrap();
        store.add_text("identical content", None, None).await.unwrap();
        assert_eq!(store.stats().total_documents, 2);
    }

    #[tokio::test]
    async fn test_search_round_trip() {
        let (_dir, store) = make_store();
        store
            .add_text("the quarterly budget forecast", None, None)
            .await
            .unwrap();

        let results = store
            .search("the quarterly budget forecast", 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-5);
        assert!(results[0].document.content.contains("budget"));
    }

    #[tokio::test]
    async fn test_search_empty_query_rejected() {
        let (_dir, store) = make_store();
        let err = store.search("", 10).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_search_empty_corpus_returns_empty() {
        let (_dir, store) = make_store();
        let results = store.search("anything", 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_by_category_filters() {
        let (_dir, store) = make_store();
        store
            .add_text("remote work policy", None, Some("policy".to_string()))
            .await
            .unwrap();
        store
            .add_text("server setup guide", None, Some("tech".to_string()))
            .await
            .unwrap();

        let results = store
            .search_by_category("remote work policy", "policy", 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].document.metadata.category.as_deref(),
            Some("policy")
        );

        let results = store
            .search_by_category("remote work policy", "legal", 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_caps_max_results() {
        let dir = tempfile::tempdir().unwrap();
        let reader = DocumentReader::new(dir.path(), vec!["txt".to_string()]);
        let rag = RagConfig {
            similarity_threshold: -1.0,
            max_top_k: 3,
            ..RagConfig::default()
        };
        let store = DocumentStore::new(Box::new(MockEmbedding::new()), reader, &rag);

        for i in 0..10 {
            store
                .add_text(&format!("document number {}", i), None, None)
                .await
                .unwrap();
        }
        let results = store.search("document", 100).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_threshold_excludes_unrelated_text() {
        let dir = tempfile::tempdir().unwrap();
        let reader = DocumentReader::new(dir.path(), vec!["txt".to_string()]);
        let rag = RagConfig::default(); // threshold 0.75
        let store = DocumentStore::new(Box::new(MockEmbedding::new()), reader, &rag);

        store
            .add_text("completely unrelated content", None, None)
            .await
            .unwrap();

        // Hash-based mock vectors for different texts are effectively
        // orthogonal, so nothing clears the 0.75 bar.
        let results = store.search("different query text", 10).await.unwrap();
        assert!(results.is_empty());

        // An identical query scores 1.0 and passes.
        let results = store
            .search("completely unrelated content", 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_file_txt() {
        let (_dir, store) = make_store();
        let count = store
            .ingest_file("notes.txt", b"meeting notes from the offsite", None)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_ingest_file_empty_rejected() {
        let (_dir, store) = make_store();
        let err = store.ingest_file("notes.txt", b"", None).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyFile));
    }

    #[tokio::test]
    async fn test_ingest_file_unsupported_type_rejected() {
        let (_dir, store) = make_store();
        let err = store
            .ingest_file("binary.exe", b"MZ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFileType { .. }));
        // Rejected before anything was indexed.
        assert_eq!(store.stats().total_documents, 0);
    }

    #[tokio::test]
    async fn test_ingest_file_carries_category() {
        let (_dir, store) = make_store();
        store
            .ingest_file(
                "handbook.md",
                b"# Handbook\nall about the handbook",
                Some("hr".to_string()),
            )
            .await
            .unwrap();
        let stats = store.stats();
        assert_eq!(stats.categories.get("hr"), Some(&1));
    }

    #[tokio::test]
    async fn test_stats_reports_types_and_categories() {
        let (_dir, store) = make_store();
        store
            .add_text("a", Some("t".into()), Some("alpha".to_string()))
            .await
            .unwrap_err(); // too short for min chunk size
        store
            .add_text("long enough content", None, Some("alpha".to_string()))
            .await
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_documents, 1);
        assert_eq!(stats.categories.get("alpha"), Some(&1));
        assert_eq!(stats.supported_file_types, vec!["txt", "md", "pdf"]);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let (_dir, store) = make_store();
        store.add_text("first document", None, None).await.unwrap();
        store.add_text("second document", None, None).await.unwrap();

        let removed = store.clear_all().unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.stats().total_documents, 0);
    }
}
