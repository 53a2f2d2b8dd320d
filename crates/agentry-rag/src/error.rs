//! Error types for agents and retrieval

use agentry_llm::LlmError;
use thiserror::Error;

/// Result alias used throughout the crate
pub type RagResult<T> = Result<T, RagError>;

/// Errors produced by agents, tools, storage and retrieval
#[derive(Debug, Error)]
pub enum RagError {
    /// Model call failed
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// Agent-level failure
    #[error("agent '{agent_id}' failed: {message}")]
    Agent {
        /// Agent name
        agent_id: String,
        /// What happened
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The run did not produce a final answer within the turn budget
    #[error("max turns ({max_turns}) exceeded")]
    MaxTurnsExceeded {
        /// Configured budget
        max_turns: usize,
    },

    /// A tool failed while executing
    #[error("tool '{tool}' failed: {message}")]
    Tool {
        /// Tool name
        tool: String,
        /// What happened
        message: String,
    },

    /// An input value violated a constraint
    #[error("invalid {field}: {constraint} (got {value})")]
    Validation {
        /// Field name
        field: String,
        /// Constraint that was violated
        constraint: String,
        /// Offending value
        value: String,
    },

    /// Storage backend failure
    #[error("storage operation '{operation}' failed: {source}")]
    Storage {
        /// Operation name
        operation: String,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// Model output could not be parsed into the requested type
    #[error("failed to parse structured output: {0}")]
    OutputParse(#[source] serde_json::Error),

    /// The requested model provider is not supported
    #[error("Model provider '{0}' is not supported.")]
    UnsupportedProvider(String),

    /// Invalid settings
    #[error("configuration error: {0}")]
    Config(String),
}

impl RagError {
    /// Create an agent error
    pub fn agent(agent_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Agent {
            agent_id: agent_id.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a tool error
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
        }
    }

    /// Create a storage error
    pub fn storage(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            operation: operation.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for RagError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
