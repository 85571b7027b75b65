//! Knowledge retrieval for brewflow
//!
//! Embeds queries with an asymmetric prefix scheme, searches an
//! in-memory normalized vector index by dot product, and returns ranked
//! passages above a relevance floor. Read-only at runtime; the corpus is
//! loaded and indexed once at startup.

pub mod embeddings;
pub mod http_embeddings;
pub mod retriever;
pub mod vector_store;

pub use embeddings::{l2_normalize, EmbeddingBackend, HashEmbedder};
pub use http_embeddings::{HttpEmbedder, HttpEmbedderConfig};
pub use retriever::{KnowledgeRetriever, RetrievedPassage, RetrieverConfig};
pub use vector_store::{load_corpus, Document, VectorIndex, VectorSearchResult};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Corpus error: {0}")]
    Corpus(String),
}

impl From<RagError> for brewflow_core::Error {
    fn from(err: RagError) -> Self {
        brewflow_core::Error::RetrievalUnavailable(err.to_string())
    }
}
