//! Triage agents handing customers off to specialists

use agentry_demos::cli::{init_tracing, ModelArgs};
use agentry_rag::agent::{
    Agent, Handoff, RunConfig, RunContext, Runner, RECOMMENDED_PROMPT_PREFIX,
};
use clap::Parser;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Customer service triage with basic, customized and data-carrying handoffs")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,
}

/// Passed along when a service agent escalates
#[derive(Debug, Deserialize, JsonSchema)]
struct EscalationData {
    /// Why the issue is being escalated
    reason: String,
    /// Low, Normal, High or Urgent
    priority: Option<String>,
    /// Standard, Premium or VIP
    customer_tier: Option<String>,
}

fn specialist(name: &str, instructions: &str, description: &str) -> Arc<Agent> {
    Agent::builder(name)
        .instructions(format!("{}\n{}", RECOMMENDED_PROMPT_PREFIX, instructions))
        .handoff_description(description)
        .build_arc()
}

fn logged(agent: Arc<Agent>) -> Handoff {
    let name = agent.name().to_string();
    Handoff::new(agent).on_handoff(move |_ctx, _input| {
        let name = name.clone();
        async move {
            println!("Handoff called for agent: {}", name);
            Ok(())
        }
    })
}

fn account_handoff(account: Arc<Agent>) -> Handoff {
    Handoff::new(account)
        .tool_name_override("escalate_to_account_team")
        .tool_description_override(
            "Transfer the customer to the account management team for help with account settings, password resets, etc.",
        )
        .on_handoff(|_ctx, _input| async move {
            println!(
                "[LOG] Account handoff triggered at {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
            Ok(())
        })
}

fn escalation_handoff(escalation: Arc<Agent>) -> Handoff {
    Handoff::new(escalation)
        .input_type::<EscalationData>()
        .on_handoff(|_ctx, input| async move {
            let data: EscalationData = serde_json::from_value(input).map_err(|e| {
                agentry_rag::RagError::tool("transfer_to_escalation_agent", e.to_string())
            })?;
            println!("[ESCALATION] Reason: {}", data.reason);
            println!("[ESCALATION] Priority: {}", data.priority.as_deref().unwrap_or("None"));
            println!("[ESCALATION] Customer tier: {}", data.customer_tier.as_deref().unwrap_or("None"));
            Ok(())
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Cli::parse();
    let config = RunConfig::new(Arc::new(args.model.client()?));

    // Billing and refunds with logging callbacks
    let billing = specialist(
        "Billing Agent",
        "You handle billing-related queries, including invoices, payments, and pricing questions. Be professional and precise.",
        "Specialist agent for Billing questions",
    );
    let refund = specialist(
        "Refund Agent",
        "You handle refund requests and related policies. Be empathetic while following refund guidelines.",
        "Specialist agent for Refund questions",
    );
    let triage = Agent::builder("Triage Agent")
        .instructions(
            "You are the first point of contact. Direct billing questions to the Billing Agent \
             and refund requests to the Refund Agent. If unsure, handle the query yourself.",
        )
        .handoff(logged(billing))
        .handoff(logged(refund))
        .build_arc();

    let result = Runner::run(triage, "I need help with my billing", RunContext::new(()), &config).await?;
    println!("{}\n", result.final_output);

    // Customer service triage, plain and enhanced
    let billing = specialist(
        "Billing Agent",
        "You are a billing specialist who helps customers with payment issues.\n\
         Focus on resolving billing inquiries, subscription changes, and refund requests.\n\
         If asked about technical problems or account settings, explain that you specialize\n\
         in billing and payment matters only.",
        "Specialist agent for billing and payment questions",
    );
    let technical = specialist(
        "Technical Agent",
        "You are a technical support specialist who helps with product issues.\n\
         Assist users with troubleshooting, error messages, and how-to questions.\n\
         Focus on resolving technical problems only.",
        "Specialist agent for technical problems",
    );
    let account = specialist(
        "Account Management",
        "You help customers with account-related issues such as\n\
         password resets, account settings, and profile updates.",
        "Specialist agent for account settings",
    );

    let customer_service = Agent::builder("Customer Service")
        .instructions(
            "You are the initial customer service contact who helps direct\n\
             customers to the right specialist.\n\n\
             If the customer has billing or payment questions, hand off to the Billing Agent.\n\
             If the customer has technical problems or how-to questions, hand off to the Technical Agent.\n\
             For general inquiries or questions about products, you can answer directly.\n\n\
             Always be polite and helpful, and ensure a smooth transition when handing off to specialists.",
        )
        .handoff(Arc::clone(&billing))
        .handoff(Arc::clone(&technical))
        .build_arc();

    let inquiries = [
        ("Billing", "I was charged twice for my subscription last month. Can I get a refund?"),
        (
            "Technical",
            "The app keeps crashing when I try to upload photos. How can I fix this? Give me the shortest solution possible.",
        ),
        ("General", "What are your business hours?"),
    ];
    for (kind, inquiry) in inquiries {
        let result = Runner::run(Arc::clone(&customer_service), inquiry, RunContext::new(()), &config).await?;
        println!("{} inquiry response ({}):\n{}\n", kind, result.last_agent.name(), result.final_output);
    }

    let enhanced = Agent::builder("Enhanced Customer Service")
        .instructions(
            "You are the initial customer service contact who directs\n\
             customers to the right specialist.\n\n\
             If the customer has billing or payment questions, hand off to the Billing Agent.\n\
             If the customer has technical problems, hand off to the Technical Agent.\n\
             If the customer needs to change account settings, hand off to the Account Management agent.\n\
             For general inquiries, you can answer directly.",
        )
        .handoff(billing)
        .handoff(account_handoff(account))
        .handoff(technical)
        .build_arc();

    let result = Runner::run(enhanced, "I need to change my password.", RunContext::new(()), &config).await?;
    println!("Account management inquiry response:\n{}\n", result.final_output);

    // Escalation carrying structured data
    let escalation = Agent::builder("Escalation Agent")
        .instructions(
            "You handle complex or sensitive customer issues that require\n\
             special attention. Always address the customer's concerns with extra care and detail.",
        )
        .build_arc();
    let service = Agent::builder("Service Agent")
        .instructions(
            "You are a customer service agent who handles general inquiries.\n\n\
             For complex issues, escalate to the Escalation Agent and provide:\n\
             - The reason for escalation\n\
             - Priority level (Low, Normal, High, Urgent)\n\
             - Customer tier if mentioned (Standard, Premium, VIP)",
        )
        .handoff(escalation_handoff(escalation))
        .build_arc();

    let result = Runner::run(
        service,
        "I'm a VIP customer and my account was hacked; unauthorized orders were placed and I need this fixed today.",
        RunContext::new(()),
        &config,
    )
    .await?;
    println!("Escalation response ({}):\n{}", result.last_agent.name(), result.final_output);

    Ok(())
}
