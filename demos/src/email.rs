//! Structured extraction from emails

use agentry_rag::agent::{Agent, RunConfig, RunContext, Runner};
use agentry_rag::RagResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// The Project Phoenix status email used by the demo
pub const SAMPLE_EMAIL: &str = include_str!("../data/sample_email.txt");

const INSTRUCTIONS: &str = "You are an email processing assistant that extracts structured information from emails.
Parse the email content and extract:
- Sender and recipient information
- Main discussion points
- Meeting details
- Action items and tasks
- Next steps

Format the output according to the EmailData model structure.";

/// Someone mentioned in an email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Person {
    /// Full name
    pub name: String,
    /// Job title, when stated
    pub role: Option<String>,
    /// Email address or phone number
    pub contact: Option<String>,
}

/// A meeting proposed in an email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Meeting {
    /// Day of the meeting
    pub date: String,
    /// Start time
    pub time: String,
    /// Room or link
    pub location: Option<String>,
    /// Expected length
    pub duration: Option<String>,
}

/// An action item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActionItem {
    /// What needs doing
    pub description: String,
    /// Who does it
    pub assignee: Option<String>,
    /// When it is due
    pub deadline: Option<String>,
    /// Priority, e.g. "High"
    pub priority: Option<String>,
}

/// Everything extracted from one email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmailData {
    /// Subject line
    pub subject: String,
    /// Author
    pub sender: Person,
    /// To and CC recipients
    pub recipients: Vec<Person>,
    /// Key discussion points
    pub main_points: Vec<String>,
    /// Proposed meetings
    pub meetings: Vec<Meeting>,
    /// Action items
    pub tasks: Vec<ActionItem>,
    /// Summary of what happens next
    pub next_steps: Option<String>,
}

impl EmailData {
    /// Human readable report
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Subject: {}", self.subject);
        let _ = writeln!(
            out,
            "From: {} ({})",
            self.sender.name,
            self.sender.role.as_deref().unwrap_or("unknown role")
        );

        out.push_str("\nRecipients:\n");
        for recipient in &self.recipients {
            let _ = writeln!(out, "- {}", recipient.name);
        }

        out.push_str("\nMain Points:\n");
        for point in &self.main_points {
            let _ = writeln!(out, "- {}", point);
        }

        out.push_str("\nMeetings:\n");
        for meeting in &self.meetings {
            let _ = writeln!(
                out,
                "- {} at {} ({})",
                meeting.date,
                meeting.time,
                meeting.duration.as_deref().unwrap_or("duration not given")
            );
        }

        out.push_str("\nTasks:\n");
        for task in &self.tasks {
            let _ = writeln!(
                out,
                "- {} (Priority: {})",
                task.description,
                task.priority.as_deref().unwrap_or("none")
            );
        }

        out.push_str("\nNext Steps:\n");
        out.push_str(self.next_steps.as_deref().unwrap_or("None"));
        out
    }
}

/// The "Email Processor" agent
pub fn email_agent() -> Agent {
    Agent::builder("Email Processor")
        .instructions(INSTRUCTIONS)
        .output_type::<EmailData>()
        .build()
}

/// Extract [`EmailData`] from `email`
pub async fn process_email(email: &str, config: &RunConfig) -> RagResult<EmailData> {
    Runner::run_typed::<EmailData, ()>(
        &email_agent(),
        format!(
            "Please parse this email and extract structured information:\n\n{}",
            email
        ),
        RunContext::new(()),
        config,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;
    use serde_json::json;
    use std::sync::Arc;

    fn extracted() -> serde_json::Value {
        json!({
            "subject": "Project Phoenix Update and Next Steps",
            "sender": {"name": "Alex Johnson", "role": "Senior Project Manager", "contact": "alex.j@techcorp.com"},
            "recipients": [
                {"name": "Team Development", "role": null, "contact": "team-dev@techcorp.com"},
                {"name": "Sarah Wong", "role": null, "contact": "sarah.w@techcorp.com"}
            ],
            "main_points": ["Beta testing shows 85% positive feedback"],
            "meetings": [{"date": "June 15th", "time": "2:00 PM", "location": "Conference Room B", "duration": "1.5 hours"}],
            "tasks": [{"description": "Fix mobile performance", "assignee": "Sarah", "deadline": "June 20th", "priority": "High"}],
            "next_steps": "Prepare the updated project timeline"
        })
    }

    #[test]
    fn test_sample_email_is_bundled() {
        assert!(SAMPLE_EMAIL.contains("Subject: Project Phoenix Update and Next Steps"));
    }

    #[tokio::test]
    async fn test_process_email_parses_structured_output() {
        let model = Arc::new(ScriptedModel::new().then_text(format!("```json\n{}\n```", extracted())));
        let config = RunConfig::new(model.clone());

        let data = process_email(SAMPLE_EMAIL, &config).await.unwrap();

        assert_eq!(data.sender.name, "Alex Johnson");
        assert_eq!(data.recipients.len(), 2);
        assert_eq!(data.meetings[0].location.as_deref(), Some("Conference Room B"));

        let report = data.report();
        assert!(report.contains("From: Alex Johnson (Senior Project Manager)"));
        assert!(report.contains("- June 15th at 2:00 PM (1.5 hours)"));
        assert!(report.contains("- Fix mobile performance (Priority: High)"));

        let request = &model.requests()[0];
        assert!(request.response_format.is_some());
        assert!(request
            .messages
            .last()
            .map(|m| m.content.contains("Alex Johnson"))
            .unwrap_or(false));
    }
}
