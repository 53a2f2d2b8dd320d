//! Document question answering with guardrails and intent routing

use agentry_demos::cli::{init_tracing, is_exit, prompt_line, ModelArgs};
use agentry_demos::genai::{DocAssistant, Reply};
use agentry_rag::config::RagSettings;
use agentry_rag::retrieval::{
    load_documents_from_folder, EmbeddingProvider, HashEmbeddingProvider, RemoteEmbeddingProvider,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Ask questions about a folder of markdown documents")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Folder of .md files to index
    #[arg(long, default_value = "demos/data/docs")]
    docs: PathBuf,

    /// Embed locally instead of calling the embeddings endpoint
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();
    let settings = RagSettings::from_env()?;

    let client = Arc::new(args.model.client()?);
    let provider: Arc<dyn EmbeddingProvider> = if args.offline {
        Arc::new(HashEmbeddingProvider::new(settings.embedding_dimensions))
    } else {
        Arc::new(RemoteEmbeddingProvider::new(client.clone(), settings.embedding_dimensions))
    };

    let documents = load_documents_from_folder(&args.docs, "md").await?;
    let assistant = DocAssistant::index(&documents, provider, client)
        .await?
        .with_model_override(args.model.model.clone());

    println!("GenAI CLI - Type 'exit' to quit.");

    while let Some(query) = prompt_line("\nYou: ")? {
        if is_exit(&query) {
            break;
        }

        match assistant.answer(&query).await {
            Ok(Reply::Blocked) => println!("⚠️  Blocked: Inappropriate or unsafe input."),
            Ok(Reply::Answer(answer)) => println!("\nAI: {}", answer),
            Err(e) => println!("[System Error] {}", e),
        }
    }

    Ok(())
}
