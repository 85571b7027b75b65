//! In-memory vector index
//!
//! A flat store over L2-normalized vectors scored by dot product, which
//! equals cosine similarity for unit vectors. The corpus is small enough
//! that a linear scan beats maintaining an ANN structure.

use crate::embeddings::EmbeddingBackend;
use crate::RagError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A knowledge chunk as stored in the corpus file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub source_id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// One search hit
#[derive(Debug, Clone)]
pub struct VectorSearchResult {
    pub id: String,
    pub score: f32,
    pub content: String,
    pub source_id: String,
    pub category: Option<String>,
}

struct IndexedChunk {
    document: Document,
    embedding: Vec<f32>,
}

/// Flat dot-product index. Immutable after startup indexing; shared
/// read-only across sessions.
#[derive(Default)]
pub struct VectorIndex {
    chunks: Vec<IndexedChunk>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with its (already normalized) embedding
    pub fn add(&mut self, document: Document, embedding: Vec<f32>) {
        self.chunks.push(IndexedChunk {
            document,
            embedding,
        });
    }

    /// Embed and index every document in the corpus
    pub async fn index_documents(
        &mut self,
        embedder: &dyn EmbeddingBackend,
        documents: Vec<Document>,
    ) -> Result<(), RagError> {
        for doc in documents {
            let embedding = embedder.embed_passage(&doc.content).await?;
            self.add(doc, embedding);
        }
        Ok(())
    }

    /// Dot-product scan, descending by score. `category_filter` restricts
    /// hits to chunks tagged with that category.
    pub fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        category_filter: Option<&str>,
    ) -> Vec<VectorSearchResult> {
        let mut scored: Vec<VectorSearchResult> = self
            .chunks
            .iter()
            .filter(|c| match category_filter {
                Some(cat) => c.document.category.as_deref() == Some(cat),
                None => true,
            })
            .map(|c| {
                let score = dot(query_embedding, &c.embedding);
                VectorSearchResult {
                    id: c.document.id.clone(),
                    score,
                    content: c.document.content.clone(),
                    source_id: c.document.source_id.clone(),
                    category: c.document.category.clone(),
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Load a JSON corpus file (an array of [`Document`])
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<Document>, RagError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| RagError::Corpus(format!("{}: {}", path.display(), e)))?;
    let documents: Vec<Document> =
        serde_json::from_str(&raw).map_err(|e| RagError::Corpus(format!("parse: {}", e)))?;
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;
    use std::io::Write;

    fn doc(id: &str, content: &str, category: Option<&str>) -> Document {
        Document {
            id: id.to_string(),
            content: content.to_string(),
            source_id: "kb".to_string(),
            category: category.map(str::to_string),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_score() {
        let embedder = HashEmbedder::new(256);
        let mut index = VectorIndex::new();
        index
            .index_documents(
                &embedder,
                vec![
                    doc("1", "wholesale pricing tiers for espresso blends", None),
                    doc("2", "delivery schedules for the north side", None),
                ],
            )
            .await
            .unwrap();

        let query = embedder.embed_query("espresso wholesale pricing").await.unwrap();
        let results = index.search(&query, 5, None);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "1");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_category_filter() {
        let embedder = HashEmbedder::new(256);
        let mut index = VectorIndex::new();
        index
            .index_documents(
                &embedder,
                vec![
                    doc("1", "espresso machine maintenance guide", Some("equipment")),
                    doc("2", "espresso blend tasting notes", Some("coffee")),
                ],
            )
            .await
            .unwrap();

        let query = embedder.embed_query("espresso").await.unwrap();
        let results = index.search(&query, 5, Some("equipment"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "1");
    }

    #[test]
    fn test_top_k_truncation() {
        let mut index = VectorIndex::new();
        for i in 0..10 {
            let mut v = vec![0.0; 4];
            v[0] = 1.0 - i as f32 * 0.05;
            index.add(doc(&i.to_string(), "text", None), v);
        }
        let results = index.search(&[1.0, 0.0, 0.0, 0.0], 3, None);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "0");
    }

    #[test]
    fn test_load_corpus_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"a","content":"roast levels","source_id":"faq"}}]"#
        )
        .unwrap();
        let docs = load_corpus(file.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "a");
        assert!(docs[0].category.is_none());
    }

    #[test]
    fn test_load_corpus_missing_file() {
        assert!(load_corpus("/nonexistent/corpus.json").is_err());
    }
}
