//! Knowledge retriever
//!
//! Ties an embedding backend to the vector index. Results below the
//! relevance floor are dropped; an empty result means "no grounded
//! answer available" and callers must not fabricate content.

use crate::embeddings::EmbeddingBackend;
use crate::vector_store::VectorIndex;
use crate::RagError;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    pub top_k: usize,
    pub min_score: f32,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            min_score: 0.35,
        }
    }
}

/// A passage usable for grounding a reply
#[derive(Debug, Clone)]
pub struct RetrievedPassage {
    pub text: String,
    pub score: f32,
    pub source_id: String,
}

pub struct KnowledgeRetriever {
    embedder: Arc<dyn EmbeddingBackend>,
    index: Arc<VectorIndex>,
    config: RetrieverConfig,
}

impl KnowledgeRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingBackend>, index: Arc<VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            config: RetrieverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RetrieverConfig) -> Self {
        self.config = config;
        self
    }

    /// Retrieve ranked passages for a query.
    ///
    /// Embedding failures surface as [`RagError`]; callers fall back to
    /// ungrounded conversation rather than blocking the turn.
    pub async fn retrieve(
        &self,
        query: &str,
        category_filter: Option<&str>,
    ) -> Result<Vec<RetrievedPassage>, RagError> {
        let query_embedding = self.embedder.embed_query(query).await?;

        let passages: Vec<RetrievedPassage> = self
            .index
            .search(&query_embedding, self.config.top_k, category_filter)
            .into_iter()
            .filter(|r| r.score >= self.config.min_score)
            .map(|r| RetrievedPassage {
                text: r.content,
                score: r.score,
                source_id: r.source_id,
            })
            .collect();

        tracing::debug!(
            query_len = query.len(),
            hits = passages.len(),
            "knowledge retrieval"
        );
        Ok(passages)
    }

    /// Render passages into a context block for prompt assembly
    pub fn format_context(passages: &[RetrievedPassage]) -> String {
        passages
            .iter()
            .map(|p| format!("[{}] {}", p.source_id, p.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
