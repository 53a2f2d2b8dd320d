//! Multi-agent graphs: a fixed pipeline and a tool-routed variant

use agentry_demos::analysis::{analysis_graph, research_graph, SAMPLE_TEXT};
use agentry_demos::cli::{init_tracing, ModelArgs};
use agentry_graph::prelude::*;
use clap::Parser;
use futures::StreamExt;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Run the researcher/summarizer graph, or the sentiment/topic graph")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Run the conditional sentiment/topic graph instead
    #[arg(long)]
    advanced: bool,
}

const TEST_CASES: [&str; 3] = [
    "I'm really happy with the new AI features!",
    "Tell me more about machine learning.",
    "This product is terrible and I'm very disappointed.",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();
    let model = Arc::new(args.model.client()?);

    if !args.advanced {
        let graph = research_graph(model)?;
        let mut steps = graph.stream(GraphState::from_user(SAMPLE_TEXT));

        while let Some(step) = steps.next().await {
            let step = step?;
            let title = match step.node.as_str() {
                "researcher" => "Research Analysis",
                _ => "Final Summary",
            };
            println!("\n{}:", title);
            println!("{}", step.state.last_ai_text().unwrap_or_default());
        }
        return Ok(());
    }

    let graph = analysis_graph(model)?;
    for input in TEST_CASES {
        println!("\nProcessing: {}", input);
        let state = graph.invoke(GraphState::from_user(input)).await?;

        println!("\nFinal Response:");
        println!("{}", state.last_message().map(|m| m.content.as_str()).unwrap_or_default());
        if let Some(sentiment) = state.get_string("sentiment") {
            println!("Detected Sentiment: {}", sentiment);
        }
        if let Some(topic) = state.get_string("topic") {
            println!("Researched Topic: {}", topic);
        }
    }
    Ok(())
}
