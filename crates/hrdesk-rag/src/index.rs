//! In-memory similarity index.
//!
//! Brute-force cosine similarity over every stored vector. The index lives
//! only for the duration of one question, so there is no persistence and no
//! approximate search structure.

use std::cmp::Ordering;

use tracing::debug;

use crate::embed::Embedder;
use crate::error::RagError;
use crate::types::{Chunk, ScoredChunk};

#[derive(Debug, Default, Clone)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed `chunks` in one pass and index them.
    pub async fn from_chunks(embedder: &dyn Embedder, chunks: Vec<Chunk>) -> Result<Self, RagError> {
        if chunks.is_empty() {
            return Ok(Self::new());
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder.embed_documents(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(RagError::Decode(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        let mut index = Self::new();
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            index.insert(chunk, vector);
        }
        debug!(entries = index.len(), "vector index built");
        Ok(index)
    }

    pub fn insert(&mut self, chunk: Chunk, vector: Vec<f32>) {
        self.entries.push((chunk, vector));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return at most `k` chunks, most similar first.
    pub fn similarity_search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, vector)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query, vector),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity; 0 for empty, zero-norm or mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> Chunk {
        Chunk {
            content: content.into(),
            source: "test".into(),
            page: 0,
        }
    }

    #[test]
    fn cosine_edge_cases() {
        assert!((cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn search_orders_by_similarity_and_truncates() {
        let mut index = VectorIndex::new();
        index.insert(chunk("east"), vec![1.0, 0.0]);
        index.insert(chunk("north"), vec![0.0, 1.0]);
        index.insert(chunk("north-east"), vec![1.0, 1.0]);

        let hits = index.similarity_search(&[0.1, 1.0], 2);
        let names: Vec<_> = hits.iter().map(|h| h.chunk.content.as_str()).collect();
        assert_eq!(names, ["north", "north-east"]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn search_on_small_index_returns_everything() {
        let mut index = VectorIndex::new();
        index.insert(chunk("only"), vec![1.0]);
        assert_eq!(index.similarity_search(&[1.0], 5).len(), 1);
        assert!(VectorIndex::new().similarity_search(&[1.0], 5).is_empty());
    }
}
