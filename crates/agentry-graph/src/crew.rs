//! Sequential crews
//!
//! A [`Crew`] is a list of role-playing members and an ordered list of
//! tasks. Each task is handled by one member, and every task sees the
//! outputs of the tasks before it.

use crate::error::{GraphError, GraphResult};
use agentry_llm::{ChatMessage, ChatModel, ChatRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::info;

/// A role-playing crew member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Job title, e.g. "Research Analyst"
    pub role: String,
    /// What the member is trying to achieve
    pub goal: String,
    /// Background that shapes the member's answers
    pub backstory: String,
}

impl CrewMember {
    /// Create a member
    pub fn new(role: impl Into<String>, goal: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

/// A unit of work assigned to one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// What to do
    pub description: String,
    /// What a good answer looks like
    pub expected_output: String,
    /// Index into [`Crew::members`]
    pub agent: usize,
}

impl Task {
    /// Task for member `agent`
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>, agent: usize) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
        }
    }
}

/// How tasks are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// One after another, in order
    #[default]
    Sequential,
}

/// Output of one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Task description, after input interpolation
    pub description: String,
    /// Role of the member that ran it
    pub agent: String,
    /// Raw model answer
    pub raw: String,
}

/// Output of a whole crew run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    /// One entry per task, in order
    pub tasks_output: Vec<TaskOutput>,
    /// Output of the last task
    pub final_output: String,
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.final_output)
    }
}

/// Members plus the tasks they work through
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Crew {
    /// Members, referenced by index from tasks
    pub members: Vec<CrewMember>,
    /// Tasks, run in order
    pub tasks: Vec<Task>,
    /// Scheduling
    pub process: Process,
}

impl Crew {
    /// Sequential crew
    pub fn new(members: Vec<CrewMember>, tasks: Vec<Task>) -> Self {
        Self {
            members,
            tasks,
            process: Process::Sequential,
        }
    }

    /// Run every task in order
    pub async fn kickoff(&self, model: &dyn ChatModel) -> GraphResult<CrewOutput> {
        self.kickoff_with_inputs(model, &HashMap::new()).await
    }

    /// Run every task, replacing `{key}` placeholders in member and task
    /// text with `inputs[key]`
    pub async fn kickoff_with_inputs(
        &self,
        model: &dyn ChatModel,
        inputs: &HashMap<String, String>,
    ) -> GraphResult<CrewOutput> {
        self.validate()?;

        let mut tasks_output: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        for (i, task) in self.tasks.iter().enumerate() {
            let member = &self.members[task.agent];
            let description = interpolate(&task.description, inputs);

            info!(
                task = i + 1,
                total = self.tasks.len(),
                agent = %member.role,
                "Working on task"
            );

            let messages = vec![
                ChatMessage::system(interpolate(&member.system_prompt(), inputs)),
                ChatMessage::user(task_prompt(
                    &description,
                    &interpolate(&task.expected_output, inputs),
                    &tasks_output,
                )),
            ];

            let response = model.chat(ChatRequest::new(messages)).await?;

            tasks_output.push(TaskOutput {
                description,
                agent: member.role.clone(),
                raw: response.content,
            });
        }

        let final_output = tasks_output
            .last()
            .map(|t| t.raw.clone())
            .unwrap_or_default();

        Ok(CrewOutput {
            tasks_output,
            final_output,
        })
    }

    fn validate(&self) -> GraphResult<()> {
        if self.tasks.is_empty() {
            return Err(GraphError::validation("tasks", "a crew needs at least one task"));
        }
        for (i, task) in self.tasks.iter().enumerate() {
            if task.agent >= self.members.len() {
                return Err(GraphError::validation(
                    "agent",
                    format!(
                        "task {} refers to member {} but the crew has {}",
                        i,
                        task.agent,
                        self.members.len()
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn task_prompt(description: &str, expected_output: &str, previous: &[TaskOutput]) -> String {
    let mut prompt = format!(
        "Current Task: {}\n\nThis is the expected criteria for your final answer: {}",
        description, expected_output
    );

    if !previous.is_empty() {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        let context: Vec<String> = previous
            .iter()
            .map(|t| format!("{}:\n{}", t.agent, t.raw))
            .collect();
        prompt.push_str(&context.join("\n\n"));
    }

    prompt.push_str("\n\nBegin! Give your best complete final answer.");
    prompt
}

fn interpolate(template: &str, inputs: &HashMap<String, String>) -> String {
    inputs.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;
    use agentry_llm::MessageRole;

    fn starter_crew() -> Crew {
        Crew::new(
            vec![
                CrewMember::new(
                    "Research Analyst",
                    "Conduct thorough research on {topic}",
                    "You are an expert research analyst.",
                ),
                CrewMember::new(
                    "Content Writer",
                    "Create engaging content based on research",
                    "You are a skilled content writer.",
                ),
            ],
            vec![
                Task::new("Research {topic}", "A list of key findings", 0),
                Task::new("Write an article about {topic}", "A short article", 1),
            ],
        )
    }

    #[tokio::test]
    async fn test_sequential_kickoff_passes_context() {
        let model = ScriptedModel::new()
            .then_text("findings: faster diagnosis")
            .then_text("article: AI speeds up diagnosis");

        let inputs = HashMap::from([("topic".to_string(), "AI in Healthcare".to_string())]);
        let output = starter_crew().kickoff_with_inputs(&model, &inputs).await.unwrap();

        assert_eq!(output.tasks_output.len(), 2);
        assert_eq!(output.tasks_output[0].description, "Research AI in Healthcare");
        assert_eq!(output.final_output, "article: AI speeds up diagnosis");
        assert_eq!(output.to_string(), output.final_output);

        let requests = model.requests();
        assert_eq!(requests[0].messages[0].role, MessageRole::System);
        assert!(requests[0].messages[0].content.contains("Research Analyst"));
        assert!(requests[0].messages[0].content.contains("AI in Healthcare"));
        assert!(!requests[0].messages[1].content.contains("context you're working with"));

        let second = &requests[1].messages[1].content;
        assert!(second.contains("A short article"));
        assert!(second.contains("findings: faster diagnosis"));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let model = ScriptedModel::new();

        let empty = Crew::new(starter_crew().members, Vec::new());
        assert!(matches!(
            empty.kickoff(&model).await,
            Err(GraphError::Validation { .. })
        ));

        let bad_index = Crew::new(starter_crew().members, vec![Task::new("x", "y", 5)]);
        assert!(matches!(
            bad_index.kickoff(&model).await,
            Err(GraphError::Validation { ref field, .. }) if field == "agent"
        ));
        assert!(model.requests().is_empty());
    }
}
