//! Chat with short-term and long-term memory
//!
//! Recent turns live in a [`ConversationMemoryStore`] with a length cap;
//! every turn is also written to a [`VectorMemory`], so exchanges that fell
//! out of the window can still be recalled by similarity.

use agentry_llm::{ChatMessage, ChatModel, ChatRequest};
use agentry_rag::agent::memory::with_retrieved_context;
use agentry_rag::agent::{ConversationMemoryStore, VectorMemory};
use agentry_rag::retrieval::EmbeddingProvider;
use agentry_rag::storage::Memory;
use agentry_rag::RagResult;
use std::sync::Arc;
use tracing::debug;

/// System prompt of the memory chat
pub const MEMORY_SYSTEM_PROMPT: &str = "You are a SOMEWHAT helpful assistant.";

/// Recent messages kept verbatim, including the system message
pub const DEFAULT_WINDOW: usize = 10;

/// Assistant that remembers beyond its context window
pub struct MemoryChat {
    model: Arc<dyn ChatModel>,
    history: ConversationMemoryStore,
    long_term: VectorMemory,
}

impl MemoryChat {
    /// Chat whose history is stored in `storage` under `session_id`
    pub fn new(
        model: Arc<dyn ChatModel>,
        storage: Arc<dyn Memory>,
        session_id: &str,
        provider: Arc<dyn EmbeddingProvider>,
        window: usize,
    ) -> Self {
        Self {
            model,
            history: ConversationMemoryStore::new(storage, session_id, window, true),
            long_term: VectorMemory::new(provider),
        }
    }

    /// Stored recent history
    pub fn history(&self) -> &ConversationMemoryStore {
        &self.history
    }

    /// Send `question` along with recent history and recalled exchanges
    pub async fn ask(&mut self, question: &str) -> RagResult<String> {
        if self.history.is_empty().await? {
            self.history.add_message(ChatMessage::system(MEMORY_SYSTEM_PROMPT)).await?;
        }

        let question = ChatMessage::user(question);
        let recalled = self.long_term.get(&question.content).await?;

        let mut messages = self.history.get_messages().await?;
        messages.push(question.clone());
        let messages = with_retrieved_context(messages, &[recalled]);
        debug!(messages = messages.len(), "Sending chat with memory");

        let answer = ChatMessage::assistant(self.model.chat(ChatRequest::new(messages)).await?.content);

        for message in [question, answer.clone()] {
            self.history.add_message(message.clone()).await?;
            self.long_term.put(message).await?;
        }
        Ok(answer.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;
    use agentry_llm::MessageRole;
    use agentry_rag::retrieval::HashEmbeddingProvider;
    use agentry_rag::storage::InMemoryStorage;

    #[tokio::test]
    async fn test_recalls_exchange_outside_the_window() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_text("Noted.")
                .then_text("Got it.")
                .then_text("Bob likes apples."),
        );
        let storage = Arc::new(InMemoryStorage::new());
        let mut chat = MemoryChat::new(
            model.clone(),
            storage,
            "s1",
            Arc::new(HashEmbeddingProvider::new(4096)),
            3,
        );

        chat.ask("Bob likes apples.").await.unwrap();
        chat.ask("Alice likes juice.").await.unwrap();
        let answer = chat.ask("What does Bob like?").await.unwrap();
        assert_eq!(answer, "Bob likes apples.");

        let last = &model.requests()[2];
        let contents: Vec<&str> = last.messages.iter().map(|m| m.content.as_str()).collect();
        assert!(!contents.contains(&"Noted."));
        assert_eq!(&contents[1..], ["Alice likes juice.", "Got it.", "What does Bob like?"]);

        assert_eq!(last.messages[0].role, MessageRole::System);
        assert!(last.messages[0].content.starts_with(MEMORY_SYSTEM_PROMPT));
        assert!(last.messages[0].content.contains("\tUSER: Bob likes apples.\n\tASSISTANT: Noted.\n"));

        let stored = chat.history().get_messages().await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[2].content, "Bob likes apples.");
    }
}
