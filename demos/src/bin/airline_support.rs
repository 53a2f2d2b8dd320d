//! Interactive airline customer support

use agentry_demos::airline::{faq_retriever, AirlineAgents, AirlineContext, AIRLINE_FAQ};
use agentry_demos::cli::{init_tracing, is_exit, prompt_line, ModelArgs};
use agentry_llm::ChatMessage;
use agentry_rag::agent::{RunConfig, RunContext, Runner};
use agentry_rag::retrieval::{EmbeddingProvider, HashEmbeddingProvider, RemoteEmbeddingProvider};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Chat with the airline triage, FAQ and seat booking agents")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

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

    let agents = AirlineAgents::new(Arc::new(faq_retriever(AIRLINE_FAQ, provider).await?));
    let config = RunConfig::new(client).with_agents(agents.all());

    println!("Welcome to Airline Customer Support!");
    println!("You can ask questions about baggage, seats, wifi, or request seat changes. Type 'exit' to quit.\n");

    let context = RunContext::new(AirlineContext::default());
    let mut current = Arc::clone(&agents.triage);
    let mut input_items: Vec<ChatMessage> = Vec::new();

    while let Some(line) = prompt_line("You: ")? {
        if is_exit(&line) {
            break;
        }
        if line.is_empty() {
            continue;
        }

        input_items.push(ChatMessage::user(line));

        match Runner::run(Arc::clone(&current), input_items.clone(), context.clone(), &config).await {
            Ok(result) => {
                if result.new_items.is_empty() {
                    println!("No response from agent.");
                }
                for item in &result.new_items {
                    println!("{}", item.describe());
                }
                input_items = result.to_input_list();
                current = result.last_agent;
            }
            Err(e) => {
                println!("Sorry, an error occurred: {}", e);
                input_items.pop();
            }
        }
        println!();
    }

    Ok(())
}
