//! # Retrieval
//!
//! Document loading, chunking, embeddings and brute-force vector search.
//!
//! ```rust,ignore
//! use agentry_rag::retrieval::{load_documents_from_folder, HashEmbeddingProvider, RagPipeline};
//!
//! let docs = load_documents_from_folder("sample_docs", "md")?;
//! let mut rag = RagPipeline::new(Arc::new(HashEmbeddingProvider::new(256)));
//! let chunks = rag.chunk_documents(&docs, 300, 50)?;
//! rag.build_index(chunks).await?;
//! let context = rag.retrieve("What is the refund policy?", 5).await;
//! ```

mod chain;
mod document;
mod embedding;
mod index;
mod loader;
mod pipeline;
mod retriever;
mod splitter;

pub use chain::{format_documents, RagChain, RAG_SYSTEM_PROMPT};
pub use document::Document;
pub use embedding::{
    Embedding, EmbeddingProvider, HashEmbeddingProvider, RemoteEmbeddingProvider, SearchResult,
};
pub use index::FlatL2Index;
pub use loader::load_documents_from_folder;
pub use pipeline::{RagPipeline, CHUNK_SEPARATOR, RETRIEVAL_FAILED};
pub use retriever::VectorStoreRetriever;
pub use splitter::{
    split_markdown_sections, CharacterTextSplitter, RecursiveCharacterTextSplitter, TextSplitter,
};
