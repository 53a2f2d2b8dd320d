//! In-memory similarity retriever

use super::document::Document;
use super::embedding::{Embedding, EmbeddingProvider, SearchResult};
use crate::error::{RagError, RagResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Documents and their embeddings, searched by dot product
///
/// With normalized embeddings the dot product equals cosine similarity.
pub struct VectorStoreRetriever {
    documents: Vec<Document>,
    vectors: Vec<Embedding>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl VectorStoreRetriever {
    /// Embed `documents` in one batch
    pub async fn from_docs(
        documents: Vec<Document>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> RagResult<Self> {
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(RagError::validation(
                "embeddings",
                format!("expected one vector per document ({})", documents.len()),
                vectors.len().to_string(),
            ));
        }

        info!(
            documents = documents.len(),
            model = %provider.model_name(),
            "Built vector store retriever"
        );

        Ok(Self {
            documents,
            vectors,
            provider,
        })
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether there are no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Top `k` documents for `query`, best first
    pub async fn query(&self, query: &str, k: usize) -> RagResult<Vec<SearchResult<Document>>> {
        let embedded = self.provider.embed(query).await?;

        let mut scored = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| Ok((i, embedded.dot(v)?)))
            .collect::<RagResult<Vec<(usize, f32)>>>()?;

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        debug!(query = %query, k, hits = scored.len(), "Retrieved documents");

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchResult::new(self.documents[i].clone(), score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::HashEmbeddingProvider;
    use async_trait::async_trait;

    /// Drops the last text of every batch
    struct LossyProvider(HashEmbeddingProvider);

    #[async_trait]
    impl EmbeddingProvider for LossyProvider {
        async fn embed(&self, text: &str) -> RagResult<Embedding> {
            self.0.embed(text).await
        }

        async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Embedding>> {
            let keep = texts.len().saturating_sub(1);
            self.0.embed_batch(&texts[..keep]).await
        }

        fn model_name(&self) -> &str {
            "lossy"
        }

        fn dimensions(&self) -> usize {
            self.0.dimensions()
        }
    }

    fn faq() -> Vec<Document> {
        vec![
            Document::new("Baggage: one carry-on bag under 50 pounds."),
            Document::new("Seats: there are 120 seats on the plane, 22 business."),
            Document::new("Wifi: free wifi on the plane, join Airline-Wifi."),
        ]
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let provider = Arc::new(HashEmbeddingProvider::new(4096));
        let retriever = VectorStoreRetriever::from_docs(faq(), provider).await.unwrap();

        let hits = retriever.query("is there wifi", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].item.content.starts_with("Wifi"));
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_k_larger_than_corpus_returns_everything() {
        let provider = Arc::new(HashEmbeddingProvider::new(64));
        let retriever = VectorStoreRetriever::from_docs(faq(), provider).await.unwrap();

        assert_eq!(retriever.query("bag", 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_short_embedding_batch_is_rejected() {
        let provider = Arc::new(LossyProvider(HashEmbeddingProvider::new(64)));
        let err = VectorStoreRetriever::from_docs(faq(), provider).await.err().unwrap();

        assert!(matches!(err, RagError::Validation { ref field, ref value, .. } if field == "embeddings" && value == "2"));
    }
}
