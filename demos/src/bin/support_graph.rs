//! Customer support as an assistant/tools graph with per-thread memory

use agentry_demos::airline::{faq_retriever, support_graph, AIRLINE_FAQ};
use agentry_demos::cli::{init_tracing, is_exit, prompt_line, ModelArgs};
use agentry_graph::prelude::*;
use agentry_rag::retrieval::{EmbeddingProvider, HashEmbeddingProvider, RemoteEmbeddingProvider};
use clap::Parser;
use futures::StreamExt;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Chat with a policy-aware support assistant")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Passenger the assistant is talking to
    #[arg(long, default_value = "3442 587242")]
    passenger_id: String,

    /// Conversation thread; reuse it to continue a conversation
    #[arg(long, default_value = "support-demo")]
    thread: String,

    /// Embed the FAQ locally instead of calling the embeddings endpoint
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();

    let client = Arc::new(args.model.client()?);
    let provider: Arc<dyn EmbeddingProvider> = if args.offline {
        Arc::new(HashEmbeddingProvider::new(512))
    } else {
        Arc::new(RemoteEmbeddingProvider::new(client.clone(), 1536))
    };
    let retriever = Arc::new(faq_retriever(AIRLINE_FAQ, provider).await?);

    let graph = support_graph(client, retriever)?.with_checkpointer(Arc::new(MemorySaver::new()));
    let config = RunnableConfig::thread(args.thread.as_str()).with_configurable("passenger_id", args.passenger_id.as_str());

    println!("Starting conversation with the agent (thread {}). Type 'exit' to quit.", args.thread);

    while let Some(line) = prompt_line("\nYou: ")? {
        if is_exit(&line) {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let mut steps = graph.stream_with_config(GraphState::from_user(line), config.clone());
        while let Some(step) = steps.next().await {
            let step = match step {
                Ok(step) => step,
                Err(e) => {
                    println!("[Error] {}", e);
                    break;
                }
            };
            if let Some(message) = step.state.last_message() {
                match step.node.as_str() {
                    "tools" => println!("  [tool] {}", message.content.lines().next().unwrap_or_default()),
                    _ if message.has_tool_calls() => println!("  [assistant is looking something up]"),
                    _ => println!("\nAssistant: {}", message.content),
                }
            }
        }
    }

    Ok(())
}
