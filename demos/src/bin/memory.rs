//! Vector and composable memory walkthrough, plus a chat that remembers

use agentry_demos::cli::{init_tracing, is_exit, prompt_line, ModelArgs};
use agentry_demos::memory::{MemoryChat, DEFAULT_WINDOW};
use agentry_llm::ChatMessage;
use agentry_rag::agent::memory::generate_session_id;
use agentry_rag::agent::{ComposableMemory, ConversationMemory, VectorMemory};
use agentry_rag::config::RagSettings;
use agentry_rag::retrieval::{EmbeddingProvider, HashEmbeddingProvider, RemoteEmbeddingProvider};
use agentry_rag::storage::InMemoryStorage;
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Long-term chat memory retrieved by similarity")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Embed locally instead of calling the embeddings endpoint
    #[arg(long)]
    offline: bool,

    /// Start an interactive chat after the walkthrough
    #[arg(long)]
    chat: bool,
}

fn print_messages(title: &str, messages: &[ChatMessage]) {
    println!("\n{}", title);
    for message in messages {
        println!("  [{}] {}", message.role, message.content);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();
    let settings = RagSettings::from_env()?;

    let provider: Arc<dyn EmbeddingProvider> = if args.offline {
        Arc::new(HashEmbeddingProvider::new(settings.embedding_dimensions))
    } else {
        Arc::new(RemoteEmbeddingProvider::new(
            Arc::new(args.model.client()?),
            settings.embedding_dimensions,
        ))
    };

    let mut memory = VectorMemory::new(provider.clone());
    for text in ["Jerry likes juice.", "Bob likes burgers.", "Alice likes apples."] {
        memory.put(ChatMessage::user(text)).await?;
    }
    print_messages("What does Jerry like?", &memory.get("What does Jerry like?").await?);

    memory
        .set(vec![
            ChatMessage::user("Jerry likes burgers."),
            ChatMessage::user("Bob likes apples."),
            ChatMessage::assistant("Indeed, Bob likes apples."),
            ChatMessage::user("Alice likes juice."),
        ])
        .await?;
    print_messages("What does Bob like?", &memory.get("What does Bob like?").await?);

    let mut composed = ComposableMemory::new(ConversationMemory::new()).with_secondary(memory);
    composed
        .put(ChatMessage::system("You are a SOMEWHAT helpful assistant."))
        .await?;
    composed.put(ChatMessage::user("What does Bob like?")).await?;
    print_messages("Composed for: What does Bob like?", &composed.get("What does Bob like?").await?);

    if !args.chat {
        return Ok(());
    }

    let mut chat = MemoryChat::new(
        Arc::new(args.model.client()?),
        Arc::new(InMemoryStorage::new()),
        &generate_session_id(),
        provider,
        DEFAULT_WINDOW,
    );
    println!("\nMemory chat - Type 'exit' to quit.");

    while let Some(question) = prompt_line("\nYou: ")? {
        if is_exit(&question) {
            break;
        }
        match chat.ask(&question).await {
            Ok(answer) => println!("\nAI: {}", answer),
            Err(e) => println!("[System Error] {}", e),
        }
    }

    Ok(())
}
