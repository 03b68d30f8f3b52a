//! In-memory vector index with brute-force cosine similarity search.
//!
//! Each entry pairs an embedding with the full [`Document`] chunk it was
//! computed from. Search applies the similarity threshold and the optional
//! category filter inside the index, so callers only ever see qualifying
//! results. All operations are O(n) for search, which is acceptable for
//! moderate corpus sizes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use tome_core::types::{Document, ScoredDocument};

use crate::error::StoreError;

#[derive(Debug, Clone)]
struct VectorEntry {
    embedding: Vec<f32>,
    document: Document,
}

/// In-memory vector index using brute-force cosine similarity.
///
/// Thread-safe via interior RwLock; `Clone` shares the underlying entries.
/// Inserting the same content twice stores two entries under distinct ids:
/// duplicate ingestion produces duplicate chunks by design.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Arc<RwLock<HashMap<Uuid, VectorEntry>>>,
}

impl VectorIndex {
    /// Create a new empty vector index.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a document chunk with its embedding.
    pub fn insert(&self, document: Document, embedding: Vec<f32>) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Index(format!("lock poisoned: {}", e)))?;
        entries.insert(
            document.id,
            VectorEntry {
                embedding,
                document,
            },
        );
        Ok(())
    }

    /// Search for the top-k most similar chunks.
    ///
    /// Results are sorted by descending similarity. Entries scoring below
    /// `threshold` are excluded, as are entries whose category does not
    /// exactly match `category` when one is given. An empty result is a
    /// normal outcome, never an error.
    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
        threshold: f64,
        category: Option<&str>,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Index(format!("lock poisoned: {}", e)))?;

        let mut scored: Vec<ScoredDocument> = entries
            .values()
            .filter(|entry| match category {
                Some(cat) => entry.document.metadata.category.as_deref() == Some(cat),
                None => true,
            })
            .filter_map(|entry| {
                let score = cosine_similarity(query, &entry.embedding);
                if score >= threshold {
                    Some(ScoredDocument {
                        document: entry.document.clone(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    /// Remove every entry from the index, returning how many were removed.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Index(format!("lock poisoned: {}", e)))?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    /// Count stored chunks per category. Uncategorized chunks are not counted.
    pub fn category_counts(&self) -> HashMap<String, usize> {
        let entries = match self.entries.read() {
            Ok(e) => e,
            Err(_) => return HashMap::new(),
        };
        let mut counts: HashMap<String, usize> = HashMap::new();
        for entry in entries.values() {
            if let Some(ref cat) = entry.document.metadata.category {
                *counts.entry(cat.clone()).or_default() += 1;
            }
        }
        counts
    }

    /// Return the number of chunks currently stored in the index.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Return true if the index contains no chunks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
