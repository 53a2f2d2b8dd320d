//! An agent with a weather lookup tool

use agentry_demos::cli::{init_tracing, ModelArgs};
use agentry_demos::weather::{weather_tool, WeatherService};
use agentry_rag::agent::{Agent, RunConfig, RunContext, Runner};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Ask a weather assistant about a few cities")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Cities to ask about
    #[arg(long = "city", default_values_t = ["San Francisco".to_string(), "London".to_string(), "Tokyo".to_string()])]
    cities: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();

    let agent = Agent::builder("Weather Assistant")
        .instructions(
            "You are a helpful weather assistant that can provide weather information.\n\
             When asked about weather, use the get_weather tool to fetch current conditions.\n\
             Provide friendly recommendations based on the weather conditions.",
        )
        .tool(weather_tool(Arc::new(WeatherService::new())))
        .build_arc();

    let config = RunConfig::new(Arc::new(args.model.client()?));

    for city in &args.cities {
        println!("\nQuery: What's the weather like in {}?", city);
        println!("{}", "-".repeat(40));

        let result = Runner::run(
            Arc::clone(&agent),
            format!("What's the weather like in {}?", city),
            RunContext::new(()),
            &config,
        )
        .await?;

        println!("{}", result.final_output);
    }
    Ok(())
}
