//! Graph nodes

use crate::core::ExecutionContext;
use crate::error::GraphResult;
use crate::state::{GraphState, StateUpdate};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A unit of work in a graph
#[async_trait]
pub trait Node: Send + Sync {
    /// Run against the current state and return the changes to apply
    async fn execute(&self, state: &GraphState, ctx: &ExecutionContext) -> GraphResult<StateUpdate>;

    /// Node name, used in logs
    fn name(&self) -> &str;
}

type NodeFn =
    Arc<dyn Fn(GraphState, ExecutionContext) -> BoxFuture<'static, GraphResult<StateUpdate>> + Send + Sync>;

/// A node backed by an async closure
///
/// The closure receives owned copies of the state and context.
pub struct FunctionNode {
    name: String,
    func: NodeFn,
}

impl FunctionNode {
    /// Wrap `func`
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(GraphState, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = GraphResult<StateUpdate>> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(move |state, ctx| Box::pin(func(state, ctx))),
        }
    }
}

#[async_trait]
impl Node for FunctionNode {
    async fn execute(&self, state: &GraphState, ctx: &ExecutionContext) -> GraphResult<StateUpdate> {
        (self.func)(state.clone(), ctx.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
