//! A single agent answering a single prompt

use agentry_demos::cli::{init_tracing, ModelArgs};
use agentry_rag::agent::{Agent, RunConfig, RunContext, Runner};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Ask a basic agent one question")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// What to ask
    #[arg(default_value = "Write a haiku about recursion in programming.")]
    prompt: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();

    let client = args.model.client()?;
    println!("Using {} ({:?})", client.config().model, args.model.provider);

    let agent = Agent::builder("Assistant")
        .instructions("You are a helpful assistant.")
        .build_arc();

    let config = RunConfig::new(Arc::new(client));
    let result = Runner::run(agent, args.prompt.as_str(), RunContext::new(()), &config).await?;

    println!("{}", result.final_output);
    Ok(())
}
