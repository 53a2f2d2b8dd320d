//! Structured data extraction from an email

use agentry_demos::cli::{init_tracing, ModelArgs};
use agentry_demos::email::{process_email, SAMPLE_EMAIL};
use agentry_rag::agent::RunConfig;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Extract subject, people, meetings and tasks from an email")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Email to parse; the bundled sample when omitted
    #[arg(long)]
    email: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();

    let email = match &args.email {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        None => SAMPLE_EMAIL.to_string(),
    };

    let config = RunConfig::new(Arc::new(args.model.client()?));

    println!("\nProcessing email...");
    println!("{}", "=".repeat(50));

    match process_email(&email, &config).await {
        Ok(data) => {
            println!("\nExtracted Email Data:");
            println!("{}", "-".repeat(30));
            println!("{}", data.report());
            println!("{}", "=".repeat(50));
        }
        Err(e) => println!("Error processing email: {}", e),
    }
    Ok(())
}
