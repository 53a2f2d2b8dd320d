//! Chunk, index and retrieve in one place

use super::document::Document;
use super::embedding::EmbeddingProvider;
use super::index::FlatL2Index;
use super::splitter::{CharacterTextSplitter, TextSplitter};
use crate::error::{RagError, RagResult};
use std::sync::Arc;
use tracing::{error, info};

/// Separator placed between retrieved chunks
pub const CHUNK_SEPARATOR: &str = "\n---\n";

/// Returned by [`RagPipeline::retrieve`] when retrieval fails
pub const RETRIEVAL_FAILED: &str = "[Error] Retrieval failed.";

/// Document RAG pipeline over an exact L2 index
pub struct RagPipeline {
    provider: Arc<dyn EmbeddingProvider>,
    index: FlatL2Index,
    texts: Vec<String>,
}

impl RagPipeline {
    /// Pipeline whose index matches the provider's dimensions
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let index = FlatL2Index::new(provider.dimensions());
        Self {
            provider,
            index,
            texts: Vec::new(),
        }
    }

    /// Indexed chunk count
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Split documents into chunk texts with a character splitter
    pub fn chunk_documents(
        &self,
        documents: &[Document],
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> RagResult<Vec<String>> {
        let splitter = CharacterTextSplitter::new(chunk_size, chunk_overlap)?;
        Ok(splitter
            .split_documents(documents)
            .into_iter()
            .map(|d| d.content)
            .collect())
    }

    /// Embed and index `texts`
    pub async fn build_index(&mut self, texts: Vec<String>) -> RagResult<()> {
        info!(chunks = texts.len(), "Building vector index");

        let embeddings = self.provider.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(RagError::validation(
                "embeddings",
                format!("expected one vector per chunk ({})", texts.len()),
                embeddings.len().to_string(),
            ));
        }
        let vectors: Vec<Vec<f32>> = embeddings.into_iter().map(|e| e.vector).collect();
        self.index.add(&vectors)?;
        self.texts.extend(texts);

        info!(total = self.texts.len(), "Index built successfully");
        Ok(())
    }

    /// The `top_k` closest chunks
    pub async fn search(&self, query: &str, top_k: usize) -> RagResult<Vec<String>> {
        let embedded = self.provider.embed(query).await?;
        let hits = self.index.search(&embedded.vector, top_k)?;
        Ok(hits
            .into_iter()
            .filter_map(|(_, id)| self.texts.get(id).cloned())
            .collect())
    }

    /// The `top_k` closest chunks joined with `\n---\n`
    ///
    /// Failures are logged and reported as [`RETRIEVAL_FAILED`].
    pub async fn retrieve(&self, query: &str, top_k: usize) -> String {
        match self.search(query, top_k).await {
            Ok(chunks) => chunks.join(CHUNK_SEPARATOR),
            Err(e) => {
                error!(error = %e, "Retrieval failed");
                RETRIEVAL_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{Embedding, HashEmbeddingProvider};
    use async_trait::async_trait;

    struct BrokenProvider;

    #[async_trait]
    impl EmbeddingProvider for BrokenProvider {
        async fn embed(&self, _text: &str) -> RagResult<Embedding> {
            Err(RagError::validation("text", "provider offline", ""))
        }

        fn model_name(&self) -> &str {
            "broken"
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    /// Answers every batch with no vectors at all
    struct SilentProvider;

    #[async_trait]
    impl EmbeddingProvider for SilentProvider {
        async fn embed(&self, text: &str) -> RagResult<Embedding> {
            HashEmbeddingProvider::new(8).embed(text).await
        }

        async fn embed_batch(&self, _texts: &[String]) -> RagResult<Vec<Embedding>> {
            Ok(Vec::new())
        }

        fn model_name(&self) -> &str {
            "silent"
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    #[tokio::test]
    async fn test_chunk_index_retrieve() {
        let mut rag = RagPipeline::new(Arc::new(HashEmbeddingProvider::new(4096)));
        let docs = vec![
            Document::new("Refunds are issued within 14 days.\n\nShipping takes 3 days."),
            Document::new("Errors during login can be fixed by resetting the password."),
        ];

        let chunks = rag.chunk_documents(&docs, 40, 0).unwrap();
        assert_eq!(chunks.len(), 3);

        rag.build_index(chunks).await.unwrap();
        assert_eq!(rag.len(), 3);

        let context = rag.retrieve("how many days for refunds", 2).await;
        let parts: Vec<&str> = context.split(CHUNK_SEPARATOR).collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "Refunds are issued within 14 days.");
    }

    #[tokio::test]
    async fn test_retrieve_reports_failure() {
        let rag = RagPipeline::new(Arc::new(BrokenProvider));
        assert_eq!(rag.retrieve("anything", 5).await, RETRIEVAL_FAILED);
    }

    #[tokio::test]
    async fn test_missing_vectors_leave_index_empty() {
        let mut rag = RagPipeline::new(Arc::new(SilentProvider));

        let err = rag
            .build_index(vec!["one".to_string(), "two".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, RagError::Validation { ref field, ref value, .. }
            if field == "embeddings" && value == "0"));
        assert_eq!(rag.len(), 0);
    }
}
