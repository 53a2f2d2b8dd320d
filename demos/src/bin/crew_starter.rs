//! A research, writing and review crew working through tasks in order

use agentry_demos::cli::{init_tracing, ModelArgs};
use agentry_graph::crew::{Crew, CrewMember, Task};
use clap::Parser;
use std::collections::HashMap;

#[derive(Parser)]
#[command(about = "Run a sequential crew on a topic")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Topic the crew researches and writes about
    #[arg(long, default_value = "The Impact of Artificial Intelligence on Healthcare")]
    topic: String,
}

fn crew() -> Crew {
    let members = vec![
        CrewMember::new(
            "Research Analyst",
            "Conduct thorough research on given topics",
            "You are an expert research analyst with a keen eye for detail \
             and a talent for finding relevant information quickly.",
        ),
        CrewMember::new(
            "Content Writer",
            "Create engaging and informative content based on research",
            "You are a skilled content writer with experience in creating \
             clear, concise, and engaging content across various topics.",
        ),
        CrewMember::new(
            "Content Reviewer",
            "Review and improve content quality",
            "You are a meticulous content reviewer with a strong attention \
             to detail and a talent for improving content quality.",
        ),
    ];

    let tasks = vec![
        Task::new(
            "Research the topic '{topic}' and gather key information about recent developments, benefits, and challenges.",
            "A research report covering recent developments, benefits, and challenges",
            0,
        ),
        Task::new(
            "Write a comprehensive article about '{topic}' based on the research provided. Focus on making it engaging and informative.",
            "A well-structured, engaging article",
            1,
        ),
        Task::new(
            "Review the article about '{topic}'. Check for accuracy, clarity, and engagement. Provide suggestions for improvement.",
            "Review notes with concrete suggestions for improvement",
            2,
        ),
    ];

    Crew::new(members, tasks)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();
    let client = args.model.client()?;

    let inputs = HashMap::from([("topic".to_string(), args.topic.clone())]);
    let output = crew().kickoff_with_inputs(&client, &inputs).await?;

    for task in &output.tasks_output {
        println!("\n## {}\n{}", task.agent, task.raw);
    }
    println!("\n{}", "=".repeat(50));
    println!("Final Result:\n{}", output);
    Ok(())
}
