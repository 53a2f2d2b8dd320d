//! Long-term memory searched by embedding similarity
//!
//! [`VectorMemory`] groups messages into exchanges (a user message plus the
//! replies that follow it) and retrieves whole exchanges. [`ComposableMemory`]
//! puts a short-term [`ConversationMemory`] in front of any number of vector
//! memories and folds what they retrieve into the system message.

use super::conversation::ConversationMemory;
use crate::error::RagResult;
use crate::retrieval::{Embedding, EmbeddingProvider};
use agentry_llm::{ChatMessage, MessageRole};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// Exchanges returned per query unless configured otherwise
pub const DEFAULT_SIMILARITY_TOP_K: usize = 1;

const INTRO: &str = "Below are a set of relevant dialogues retrieved from potentially several memory sources:";
const OUTRO: &str = "This is the end of the retrieved message dialogues.";

struct Exchange {
    messages: Vec<ChatMessage>,
    embedding: Embedding,
}

fn exchange_text(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages retrievable by similarity to a query
pub struct VectorMemory {
    provider: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    exchanges: Vec<Exchange>,
}

impl VectorMemory {
    /// Empty memory returning the single best exchange
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            top_k: DEFAULT_SIMILARITY_TOP_K,
            exchanges: Vec::new(),
        }
    }

    /// Return the `top_k` best exchanges per query
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Store a message
    ///
    /// A user message opens a new exchange; anything else joins the
    /// current one.
    pub async fn put(&mut self, message: ChatMessage) -> RagResult<()> {
        let opens_exchange = message.role == MessageRole::User || self.exchanges.is_empty();

        let mut messages = if opens_exchange {
            Vec::new()
        } else {
            self.exchanges
                .last()
                .map(|e| e.messages.clone())
                .unwrap_or_default()
        };
        messages.push(message);

        let embedding = self.provider.embed(&exchange_text(&messages)).await?;
        let exchange = Exchange { messages, embedding };

        match self.exchanges.last_mut() {
            Some(last) if !opens_exchange => *last = exchange,
            _ => self.exchanges.push(exchange),
        }
        Ok(())
    }

    /// Replace the contents with `messages`
    pub async fn set(&mut self, messages: Vec<ChatMessage>) -> RagResult<()> {
        self.reset();
        for message in messages {
            self.put(message).await?;
        }
        Ok(())
    }

    /// Messages of the exchanges closest to `query`, best first
    pub async fn get(&self, query: &str) -> RagResult<Vec<ChatMessage>> {
        if self.exchanges.is_empty() {
            return Ok(Vec::new());
        }

        let embedded = self.provider.embed(query).await?;
        let mut scored = self
            .exchanges
            .iter()
            .map(|e| Ok((e, embedded.cosine_similarity(&e.embedding)?)))
            .collect::<RagResult<Vec<_>>>()?;
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.top_k);

        debug!(query = %query, exchanges = scored.len(), "Retrieved from vector memory");

        Ok(scored
            .into_iter()
            .flat_map(|(e, _)| e.messages.iter().cloned())
            .collect())
    }

    /// Forget everything
    pub fn reset(&mut self) {
        self.exchanges.clear();
    }

    /// Number of stored exchanges
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

/// Fold retrieved messages into the system message of `primary`
///
/// Retrieved messages already present in `primary` are skipped, as are
/// sources left empty by that. A system message is inserted when `primary`
/// has none.
pub fn with_retrieved_context(mut primary: Vec<ChatMessage>, sources: &[Vec<ChatMessage>]) -> Vec<ChatMessage> {
    let mut block = String::new();

    for (i, source) in sources.iter().enumerate() {
        let fresh: Vec<&ChatMessage> = source
            .iter()
            .filter(|m| m.role != MessageRole::System && !primary.contains(m))
            .collect();
        if fresh.is_empty() {
            continue;
        }

        let _ = write!(block, "\n\n=====Relevant messages from memory source {}=====\n\n", i + 1);
        for message in fresh {
            let _ = writeln!(block, "\t{}: {}", message.role.to_string().to_uppercase(), message.content);
        }
        let _ = write!(block, "\n=====End of relevant messages from memory source {}======", i + 1);
    }

    if block.is_empty() {
        return primary;
    }
    let context = format!("{}{}\n\n{}", INTRO, block, OUTRO);

    match primary.first_mut() {
        Some(first) if first.role == MessageRole::System => {
            first.content = format!("{}\n\n{}", first.content, context);
        }
        _ => primary.insert(0, ChatMessage::system(context)),
    }
    primary
}

/// A chat buffer backed by long-term vector memories
pub struct ComposableMemory {
    primary: ConversationMemory,
    secondary: Vec<VectorMemory>,
}

impl ComposableMemory {
    /// Compose around a chat buffer
    pub fn new(primary: ConversationMemory) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
        }
    }

    /// Add a long-term source
    pub fn with_secondary(mut self, memory: VectorMemory) -> Self {
        self.secondary.push(memory);
        self
    }

    /// The chat buffer
    pub fn primary(&self) -> &ConversationMemory {
        &self.primary
    }

    /// The long-term sources
    pub fn secondary(&self) -> &[VectorMemory] {
        &self.secondary
    }

    /// Store a message in the chat buffer and every long-term source
    pub async fn put(&mut self, message: ChatMessage) -> RagResult<()> {
        for memory in &mut self.secondary {
            memory.put(message.clone()).await?;
        }
        self.primary.add_message(message);
        Ok(())
    }

    /// Chat buffer with what the long-term sources recall for `query`
    pub async fn get(&self, query: &str) -> RagResult<Vec<ChatMessage>> {
        let mut sources = Vec::with_capacity(self.secondary.len());
        for memory in &self.secondary {
            sources.push(memory.get(query).await?);
        }
        Ok(with_retrieved_context(self.primary.to_messages(), &sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::HashEmbeddingProvider;

    fn memory() -> VectorMemory {
        VectorMemory::new(Arc::new(HashEmbeddingProvider::new(4096)))
    }

    #[tokio::test]
    async fn test_retrieves_most_similar_message() {
        let mut memory = memory();
        for text in ["Jerry likes juice.", "Bob likes burgers.", "Alice likes apples."] {
            memory.put(ChatMessage::user(text)).await.unwrap();
        }

        assert_eq!(memory.len(), 3);
        let hits = memory.get("What does Jerry like?").await.unwrap();
        assert_eq!(hits, vec![ChatMessage::user("Jerry likes juice.")]);
    }

    #[tokio::test]
    async fn test_replies_stay_with_their_user_message() {
        let mut memory = memory();
        memory.put(ChatMessage::user("stale")).await.unwrap();
        memory
            .set(vec![
                ChatMessage::user("Jerry likes burgers."),
                ChatMessage::user("Bob likes apples."),
                ChatMessage::assistant("Indeed, Bob likes apples."),
                ChatMessage::user("Alice likes juice."),
            ])
            .await
            .unwrap();

        assert_eq!(memory.len(), 3);
        let hits = memory.get("What does Bob like?").await.unwrap();
        assert_eq!(
            hits,
            vec![
                ChatMessage::user("Bob likes apples."),
                ChatMessage::assistant("Indeed, Bob likes apples."),
            ]
        );

        memory.reset();
        assert!(memory.get("Bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_composable_memory_folds_recall_into_system_message() {
        let mut long_term = memory();
        long_term
            .set(vec![
                ChatMessage::system("You are a SOMEWHAT helpful assistant."),
                ChatMessage::user("Bob likes burgers."),
                ChatMessage::assistant("Indeed, Bob likes apples."),
                ChatMessage::user("Alice likes apples."),
            ])
            .await
            .unwrap();

        let mut composed = ComposableMemory::new(ConversationMemory::new()).with_secondary(long_term);
        composed.primary.add_message(ChatMessage::user("What does Bob like?"));

        let messages = composed.get("What does Bob like?").await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.starts_with(INTRO));
        assert!(messages[0].content.contains("\tUSER: Bob likes burgers.\n\tASSISTANT: Indeed, Bob likes apples.\n"));
        assert!(messages[0].content.ends_with(OUTRO));
        assert_eq!(messages[1], ChatMessage::user("What does Bob like?"));
    }

    #[test]
    fn test_recalled_duplicates_are_skipped() {
        let primary = vec![ChatMessage::system("Be brief."), ChatMessage::user("hi")];

        let unchanged = with_retrieved_context(primary.clone(), &[vec![ChatMessage::user("hi")], vec![]]);
        assert_eq!(unchanged, primary);

        let merged = with_retrieved_context(primary, &[vec![ChatMessage::assistant("hello again")]]);
        assert!(merged[0].content.starts_with("Be brief.\n\n"));
        assert!(merged[0].content.contains("\tASSISTANT: hello again"));
        assert_eq!(merged.len(), 2);
    }
}
