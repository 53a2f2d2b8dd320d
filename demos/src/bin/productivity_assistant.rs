//! A coordinator that uses specialist agents as tools

use agentry_demos::cli::{init_tracing, ModelArgs};
use agentry_rag::agent::{Agent, RunConfig, RunContext, Runner};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Productivity assistant backed by note and task specialists")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,
}

const REQUESTS: [&str; 3] = [
    "I need to take notes about my meeting with the marketing team",
    "Set a reminder for my project deadline next Friday",
    "Help me organize my daily tasks",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();

    let notes = Agent::builder("Note Manager")
        .instructions("You help users take and organize notes efficiently.")
        .build_arc();
    let tasks = Agent::builder("Task Manager")
        .instructions("You help users manage tasks, deadlines, and priorities.")
        .build_arc();

    let assistant = Agent::builder("Productivity Assistant")
        .instructions(
            "You are a productivity assistant that helps users organize their work and personal life.\n\n\
             For note-taking questions or requests, use the note_taking tool.\n\
             For task and deadline management, use the task_management tool.\n\n\
             Help the user decide which tool is appropriate based on their request,\n\
             and coordinate between different aspects of productivity.",
        )
        .shared_tool(notes.as_tool(
            "note_taking",
            "For taking, organizing, and retrieving notes and information",
        ))
        .shared_tool(tasks.as_tool(
            "task_management",
            "For managing tasks, setting deadlines, and tracking priorities",
        ))
        .build_arc();

    let config = RunConfig::new(Arc::new(args.model.client()?));

    for request in REQUESTS {
        println!("\nUser Request: {}", request);
        println!("{}", "-".repeat(50));

        match Runner::run(Arc::clone(&assistant), request, RunContext::new(()), &config).await {
            Ok(result) => println!("Assistant Response:\n{}", result.final_output),
            Err(e) => println!("Error processing request: {}", e),
        }
        println!("{}", "=".repeat(50));
    }
    Ok(())
}
