//! Cited question answering over a set of legal documents

use agentry_llm::ChatModel;
use agentry_rag::config::RagSettings;
use agentry_rag::retrieval::{
    Document, EmbeddingProvider, RagChain, RecursiveCharacterTextSplitter, TextSplitter,
    VectorStoreRetriever,
};
use agentry_rag::RagResult;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// System prompt of the legal assistant
pub const LEGAL_PROMPT: &str = "You are a legal document assistant. Use the following context to answer the question.
If you don't know the answer, just say that you don't know. Don't try to make up an answer.
Always cite your sources using the document metadata.

Context: {context}";

/// Answer to one query, with the metadata of every chunk it was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    /// The question asked
    pub query: String,
    /// Model answer
    pub response: String,
    /// Metadata of the retrieved chunks, best match first
    pub sources: Vec<HashMap<String, String>>,
}

/// Chunked and embedded documents plus the answering chain
pub struct DocumentQa {
    retriever: VectorStoreRetriever,
    chain: RagChain,
    top_k: usize,
}

impl DocumentQa {
    /// Split `documents` with `settings` and embed the chunks
    pub async fn build(
        documents: &[Document],
        settings: &RagSettings,
        provider: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn ChatModel>,
    ) -> RagResult<Self> {
        let splitter = RecursiveCharacterTextSplitter::new(settings.chunk_size, settings.chunk_overlap)?;
        let chunks = splitter.split_documents(documents);
        info!(documents = documents.len(), chunks = chunks.len(), "Documents processed");

        Ok(Self {
            retriever: VectorStoreRetriever::from_docs(chunks, provider).await?,
            chain: RagChain::new(model).with_system_prompt(LEGAL_PROMPT),
            top_k: settings.top_k,
        })
    }

    /// Number of indexed chunks
    pub fn chunks(&self) -> usize {
        self.retriever.len()
    }

    /// Retrieve the closest chunks and answer from them
    pub async fn query(&self, query: &str) -> RagResult<QueryAnswer> {
        let documents: Vec<Document> = self
            .retriever
            .query(query, self.top_k)
            .await?
            .into_iter()
            .map(|hit| hit.item)
            .collect();

        let response = self.chain.generate_response(query, &documents).await?;

        Ok(QueryAnswer {
            query: query.to_string(),
            response,
            sources: documents.into_iter().map(|d| d.metadata).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;
    use agentry_llm::MessageRole;
    use agentry_rag::retrieval::HashEmbeddingProvider;

    fn contracts() -> Vec<Document> {
        [
            ("nda.md", "The receiving party shall keep all confidential information secret for five years."),
            ("lease.md", "The tenant pays rent on the first day of each month."),
            ("services.md", "Either party may terminate the services agreement with thirty days notice."),
            ("employment.md", "The employee is entitled to twenty days of paid vacation."),
            ("license.md", "The licensee may not sublicense the software."),
        ]
        .into_iter()
        .map(|(source, text)| Document::new(text).with_source(source))
        .collect()
    }

    #[tokio::test]
    async fn test_query_cites_top_four_chunks() {
        let model = Arc::new(ScriptedModel::new().then_text("Confidentiality lasts five years [nda.md]."));
        let qa = DocumentQa::build(
            &contracts(),
            &RagSettings::default(),
            Arc::new(HashEmbeddingProvider::new(4096)),
            model.clone(),
        )
        .await
        .unwrap();
        assert_eq!(qa.chunks(), 5);

        let answer = qa
            .query("How long must confidential information be kept secret?")
            .await
            .unwrap();

        assert_eq!(answer.response, "Confidentiality lasts five years [nda.md].");
        assert_eq!(answer.sources.len(), 4);
        assert_eq!(answer.sources[0].get("source").map(String::as_str), Some("nda.md"));

        let request = &model.requests()[0];
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert!(request.messages[0].content.starts_with("You are a legal document assistant."));
        assert!(request.messages[0].content.contains("Document 1:\nThe receiving party"));
        assert!(request.messages[0].content.contains("Source: nda.md"));
        assert_eq!(request.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_long_documents_are_split() {
        let clause = "Payment is due within thirty days of invoice. ";
        let contract = Document::new(clause.repeat(60)).with_source("msa.md");
        let qa = DocumentQa::build(
            &[contract],
            &RagSettings::default(),
            Arc::new(HashEmbeddingProvider::new(256)),
            Arc::new(ScriptedModel::new()),
        )
        .await
        .unwrap();

        assert!(qa.chunks() >= 3);
    }
}
