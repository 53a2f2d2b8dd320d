//! Lightweight agent swarm sharing context variables

use agentry_demos::cli::{init_tracing, ModelArgs};
use agentry_llm::ChatMessage;
use agentry_rag::agent::{Agent, FunctionTool, RunConfig, RunContext, Runner};
use clap::Parser;
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

type ContextVariables = HashMap<String, String>;

#[derive(Parser)]
#[command(about = "Main, support and sales agents passing a conversation along")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Name the agents greet
    #[arg(long, default_value = "Alice")]
    user_name: String,
}

#[derive(Deserialize, JsonSchema)]
struct GreetArgs {
    /// Language to greet in, e.g. "spanish"
    language: String,
}

fn user_name(vars: &ContextVariables) -> String {
    vars.get("user_name").cloned().unwrap_or_else(|| "User".to_string())
}

fn greet_tool() -> FunctionTool<ContextVariables> {
    FunctionTool::typed(
        "greet",
        "Greet the user in the specified language using context variables.",
        |ctx: RunContext<ContextVariables>, args: GreetArgs| async move {
            let greeting = if args.language.trim().eq_ignore_ascii_case("spanish") {
                "Hola"
            } else {
                "Hello"
            };
            let message = format!("{}, {}!", greeting, ctx.read(user_name));
            println!("{}", message);
            Ok(message)
        },
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();

    let sales = Agent::builder("Sales Agent")
        .instructions("You are a sales agent. Help the user with purchases.")
        .handoff_description("Transfer control to the sales agent.")
        .build_arc();

    let support = Agent::builder("Support Agent")
        .instructions("You are a support agent. Help the user with issues.")
        .handoff_description("Transfer control to the support agent.")
        .handoff(sales)
        .build_arc();

    let main_agent = Agent::builder("Main Agent")
        .dynamic_instructions(|vars: &ContextVariables| {
            format!(
                "You are the main assistant. Greet {} and help them with anything.",
                user_name(vars)
            )
        })
        .tool(greet_tool())
        .handoff(support)
        .build_arc();

    let messages = vec![
        ChatMessage::user("Hi!"),
        ChatMessage::user("Can you greet me in Spanish?"),
        ChatMessage::user("I need help with my order."),
        ChatMessage::user("Actually, I want to buy something."),
    ];
    let context = RunContext::new(HashMap::from([("user_name".to_string(), args.user_name)]));
    let config = RunConfig::new(Arc::new(args.model.client()?));

    let result = Runner::run(main_agent, messages, context, &config).await?;

    println!("Final agent: {}", result.last_agent.name());
    println!("Context variables: {:?}", result.context.snapshot());
    println!("Conversation:");
    for message in result.to_input_list() {
        if message.content.is_empty() {
            continue;
        }
        println!("{:?}: {}", message.role, message.content);
    }
    Ok(())
}
