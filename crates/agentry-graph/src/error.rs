//! Graph errors

use agentry_llm::LlmError;
use agentry_rag::RagError;
use thiserror::Error;

/// Result alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while building or running a graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// The graph structure is invalid
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A node referenced at runtime does not exist
    #[error("node '{0}' not found")]
    NodeNotFound(String),

    /// A node failed
    #[error("node '{node}' failed: {message}")]
    Execution {
        /// Node name
        node: String,
        /// What happened
        message: String,
    },

    /// A conditional edge produced a key with no mapping
    #[error("router of node '{node}' returned unmapped key '{key}'")]
    Routing {
        /// Node whose router ran
        node: String,
        /// Key returned by the router
        key: String,
    },

    /// The graph ran more steps than allowed
    #[error("recursion limit of {limit} reached without hitting END")]
    RecursionLimit {
        /// Configured limit
        limit: usize,
    },

    /// A value failed validation
    #[error("invalid {field}: {message}")]
    Validation {
        /// Field name
        field: String,
        /// What is wrong
        message: String,
    },

    /// Agent or retrieval failure
    #[error(transparent)]
    Rag(#[from] RagError),
}

impl GraphError {
    /// Create an execution error
    pub fn execution(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<LlmError> for GraphError {
    fn from(err: LlmError) -> Self {
        Self::Rag(RagError::Llm(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_errors_wrap_through_rag() {
        let err: GraphError = LlmError::EmptyResponse.into();
        assert!(matches!(err, GraphError::Rag(RagError::Llm(_))));
    }
}
