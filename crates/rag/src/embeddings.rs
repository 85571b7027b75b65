//! Embedding backend trait and test embedder
//!
//! The retrieval model is asymmetric: queries and passages are embedded
//! with distinct prefixes because the underlying models are tuned that
//! way and mixing them degrades ranking. All vectors are L2-normalized
//! so the index can score by plain dot product.

use crate::RagError;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Prefix applied to queries before embedding (E5 convention)
pub const QUERY_PREFIX: &str = "query: ";
/// Prefix applied to passages at index time
pub const PASSAGE_PREFIX: &str = "passage: ";

/// Asymmetric embedding backend
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a search query (query prefix applied)
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError>;

    /// Embed a document passage (passage prefix applied)
    async fn embed_passage(&self, text: &str) -> Result<Vec<f32>, RagError>;

    /// Output dimension
    fn dim(&self) -> usize;
}

/// Normalize a vector to unit length in place. Zero vectors are left
/// untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Deterministic bag-of-tokens embedder for tests and offline runs.
///
/// Each lowercased token is hashed into a bucket; overlapping texts get
/// high cosine similarity, disjoint texts score near zero. Not a real
/// semantic model.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for token in text.to_lowercase().split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dim;
            v[bucket] += 1.0;
        }
        l2_normalize(&mut v);
        v
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingBackend for HashEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.embed_text(&format!("{}{}", QUERY_PREFIX, text)))
    }

    async fn embed_passage(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.embed_text(&format!("{}{}", PASSAGE_PREFIX, text)))
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
