//! Execution context and per-invocation configuration

use agentry_rag::storage::Memory;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-invocation settings, like LangGraph's `RunnableConfig`
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Conversation thread; enables checkpointing when set
    pub thread_id: Option<String>,

    /// Free-form values visible to every node
    pub configurable: HashMap<String, Value>,

    /// Node executions allowed for this invocation; the graph's limit when unset
    pub recursion_limit: Option<usize>,
}

impl RunnableConfig {
    /// Config for a thread
    pub fn thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    /// Cap node executions for this invocation
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    /// Add a configurable value
    pub fn with_configurable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configurable.insert(key.into(), value.into());
        self
    }
}

/// What a node can see about the run it is part of
#[derive(Clone)]
pub struct ExecutionContext {
    graph_id: String,
    node: String,
    step: usize,
    config: RunnableConfig,
    memory: Option<Arc<dyn Memory>>,
}

impl ExecutionContext {
    /// Context for `node` in graph `graph_id`
    pub fn new(graph_id: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            graph_id: graph_id.into(),
            node: node.into(),
            step: 0,
            config: RunnableConfig::default(),
            memory: None,
        }
    }

    /// Attach invocation config
    pub fn with_config(mut self, config: RunnableConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a memory backend with nodes
    pub fn with_memory(mut self, memory: Arc<dyn Memory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub(crate) fn at(&self, node: &str, step: usize) -> Self {
        let mut ctx = self.clone();
        ctx.node = node.to_string();
        ctx.step = step;
        ctx
    }

    /// Graph name
    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    /// Node currently executing
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Step number, starting at 1
    pub fn step(&self) -> usize {
        self.step
    }

    /// Thread id, when checkpointing
    pub fn thread_id(&self) -> Option<&str> {
        self.config.thread_id.as_deref()
    }

    /// A configurable value
    pub fn configurable(&self, key: &str) -> Option<&Value> {
        self.config.configurable.get(key)
    }

    /// Shared memory backend
    pub fn memory(&self) -> Option<&Arc<dyn Memory>> {
        self.memory.as_ref()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("graph_id", &self.graph_id)
            .field("node", &self.node)
            .field("step", &self.step)
            .field("config", &self.config)
            .field("memory", &self.memory.is_some())
            .finish()
    }
}
