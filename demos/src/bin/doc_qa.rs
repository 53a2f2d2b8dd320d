//! Legal document assistant answering with cited sources

use agentry_demos::cli::{init_tracing, is_exit, prompt_line, ModelArgs};
use agentry_demos::doc_qa::DocumentQa;
use agentry_rag::config::RagSettings;
use agentry_rag::retrieval::{
    load_documents_from_folder, EmbeddingProvider, HashEmbeddingProvider, RemoteEmbeddingProvider,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Ask questions about a folder of legal documents")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Folder of .md contracts to index
    #[arg(long, default_value = "demos/data/legal")]
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
    let qa = DocumentQa::build(&documents, &settings, provider, client).await?;

    println!("Legal Document Assistant - {} chunks indexed. Type 'exit' to quit.", qa.chunks());

    while let Some(query) = prompt_line("\nQuestion: ")? {
        if is_exit(&query) {
            break;
        }
        if query.is_empty() {
            continue;
        }

        match qa.query(&query).await {
            Ok(answer) => println!("{}", serde_json::to_string_pretty(&answer)?),
            Err(e) => println!("[System Error] {}", e),
        }
    }

    Ok(())
}
