//! State graph builder and executor
//!
//! A [`StateGraph`] is a set of named [`Node`]s connected by edges. Plain
//! edges always go to the same node; conditional edges call a router on the
//! current state and look its key up in a mapping. Execution starts at the
//! node reached from [`START`] and stops when an edge leads to [`END`].

use crate::checkpoint::Checkpointer;
use crate::core::{ExecutionContext, RunnableConfig};
use crate::error::{GraphError, GraphResult};
use crate::node::Node;
use crate::state::{GraphState, StateUpdate};
use agentry_rag::storage::Memory;
use async_stream::try_stream;
use futures::stream::BoxStream;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Virtual entry node
pub const START: &str = "__start__";

/// Virtual exit node
pub const END: &str = "__end__";

/// Default maximum number of node executions per invocation
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

type Router = Arc<dyn Fn(&GraphState) -> String + Send + Sync>;

#[derive(Clone)]
enum Edge {
    Direct(String),
    Conditional {
        router: Router,
        // Empty means the router returns node names directly
        mapping: HashMap<String, String>,
    },
}

impl Edge {
    fn targets(&self) -> Vec<&str> {
        match self {
            Self::Direct(to) => vec![to.as_str()],
            Self::Conditional { mapping, .. } => mapping.values().map(String::as_str).collect(),
        }
    }
}

/// Graph under construction
pub struct StateGraph {
    name: String,
    nodes: HashMap<String, Arc<dyn Node>>,
    order: Vec<String>,
    edges: HashMap<String, Edge>,
    errors: Vec<String>,
}

impl StateGraph {
    /// Empty graph called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: HashMap::new(),
            order: Vec::new(),
            edges: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Add a node
    pub fn add_node(mut self, name: impl Into<String>, node: impl Node + 'static) -> Self {
        let name = name.into();
        if name == START || name == END {
            self.errors.push(format!("'{}' is a reserved node name", name));
        } else if self.nodes.contains_key(&name) {
            self.errors.push(format!("node '{}' added twice", name));
        } else {
            self.order.push(name.clone());
            self.nodes.insert(name, Arc::new(node));
        }
        self
    }

    /// Always continue from `from` to `to`
    pub fn add_edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let to = to.into();
        self.insert_edge(from.into(), Edge::Direct(to))
    }

    /// Continue from `from` to whatever `mapping[router(state)]` names
    ///
    /// With an empty mapping the router's return value is used as the node
    /// name.
    pub fn add_conditional_edges<R, I, K, V>(self, from: impl Into<String>, router: R, mapping: I) -> Self
    where
        R: Fn(&GraphState) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mapping = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.insert_edge(
            from.into(),
            Edge::Conditional {
                router: Arc::new(router),
                mapping,
            },
        )
    }

    /// Same as `add_edge(START, node)`
    pub fn set_entry_point(self, node: impl Into<String>) -> Self {
        self.add_edge(START, node)
    }

    fn insert_edge(mut self, from: String, edge: Edge) -> Self {
        if from == END {
            self.errors.push("END cannot have outgoing edges".to_string());
            return self;
        }
        if let Some(existing) = self.edges.get(&from) {
            let kind = match (existing, &edge) {
                (Edge::Direct(_), Edge::Direct(_)) => "more than one plain edge",
                (Edge::Conditional { .. }, Edge::Conditional { .. }) => "more than one set of conditional edges",
                _ => "both a plain edge and conditional edges",
            };
            self.errors.push(format!("node '{}' has {}", from, kind));
            return self;
        }
        self.edges.insert(from, edge);
        self
    }

    /// Validate and freeze the graph
    pub fn compile(self) -> GraphResult<CompiledGraph> {
        let mut errors = self.errors;

        if !self.edges.contains_key(START) {
            errors.push("no entry point, add an edge from START".to_string());
        }

        let known = |name: &str| name == END || self.nodes.contains_key(name);
        for (from, edge) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                errors.push(format!("edge from unknown node '{}'", from));
            }
            for to in edge.targets() {
                if !known(to) {
                    errors.push(format!("edge from '{}' to unknown node '{}'", from, to));
                }
            }
        }

        for name in &self.order {
            if !self.edges.contains_key(name) {
                errors.push(format!("node '{}' has no outgoing edge", name));
            }
        }

        if !errors.is_empty() {
            errors.sort();
            return Err(GraphError::InvalidGraph(errors.join("; ")));
        }

        warn_unreachable(&self.name, &self.order, &self.edges);

        info!(graph = %self.name, nodes = self.nodes.len(), "Compiled graph");

        Ok(CompiledGraph {
            name: self.name,
            nodes: Arc::new(self.nodes),
            edges: Arc::new(self.edges),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            checkpointer: None,
            memory: None,
        })
    }
}

fn warn_unreachable(graph: &str, order: &[String], edges: &HashMap<String, Edge>) {
    let mut topology: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    index.insert(START, topology.add_node(START));
    index.insert(END, topology.add_node(END));
    for name in order {
        index.insert(name.as_str(), topology.add_node(name.as_str()));
    }

    for (from, edge) in edges {
        let Some(&source) = index.get(from.as_str()) else {
            continue;
        };
        let targets: Vec<&str> = match edge {
            Edge::Conditional { mapping, .. } if mapping.is_empty() => {
                order.iter().map(String::as_str).chain([END]).collect()
            }
            _ => edge.targets(),
        };
        for to in targets {
            if let Some(&target) = index.get(to) {
                topology.add_edge(source, target, ());
            }
        }
    }

    let mut reached = vec![false; topology.node_count()];
    let mut dfs = Dfs::new(&topology, index[START]);
    while let Some(node) = dfs.next(&topology) {
        reached[node.index()] = true;
    }

    for name in order {
        if !reached[index[name.as_str()].index()] {
            warn!(graph = %graph, node = %name, "Node is unreachable from START");
        }
    }
}

/// One executed step, as yielded by [`CompiledGraph::stream`]
#[derive(Debug, Clone)]
pub struct GraphStep {
    /// Node that ran
    pub node: String,

    /// Step number, starting at 1
    pub step: usize,

    /// State after merging the node's update
    pub state: GraphState,
}

/// A validated, runnable graph
///
/// Cheap to clone; nodes and edges are shared.
#[derive(Clone)]
pub struct CompiledGraph {
    name: String,
    nodes: Arc<HashMap<String, Arc<dyn Node>>>,
    edges: Arc<HashMap<String, Edge>>,
    recursion_limit: usize,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    memory: Option<Arc<dyn Memory>>,
}

impl CompiledGraph {
    /// Graph name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node names
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Maximum node executions per invocation
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Persist state per thread id
    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Memory backend exposed to nodes through [`ExecutionContext::memory`]
    pub fn with_memory(mut self, memory: Arc<dyn Memory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Run to completion with default config
    pub async fn invoke(&self, input: GraphState) -> GraphResult<GraphState> {
        self.invoke_with_config(input, &RunnableConfig::default()).await
    }

    /// Run to completion
    ///
    /// With a checkpointer and a thread id, `input` is merged into the
    /// thread's saved state and the result is saved back.
    pub async fn invoke_with_config(&self, input: GraphState, config: &RunnableConfig) -> GraphResult<GraphState> {
        let mut state = self.initial_state(input, config).await?;
        let ctx = self.context(config);

        let mut current = self.route(START, &state)?;
        let mut step = 0;

        while current != END {
            step += 1;
            current = self.step(&current, step, &mut state, &ctx, config).await?;
        }

        info!(graph = %self.name, steps = step, "Graph finished");
        Ok(state)
    }

    /// Run, yielding the state after every node
    pub fn stream(&self, input: GraphState) -> BoxStream<'static, GraphResult<GraphStep>> {
        self.stream_with_config(input, RunnableConfig::default())
    }

    /// [`stream`](Self::stream) with explicit config
    pub fn stream_with_config(&self, input: GraphState, config: RunnableConfig) -> BoxStream<'static, GraphResult<GraphStep>> {
        let graph = self.clone();

        Box::pin(try_stream! {
            let mut state = graph.initial_state(input, &config).await?;
            let ctx = graph.context(&config);

            let mut current = graph.route(START, &state)?;
            let mut step = 0;

            while current != END {
                step += 1;
                let next = graph.step(&current, step, &mut state, &ctx, &config).await?;
                yield GraphStep {
                    node: current.clone(),
                    step,
                    state: state.clone(),
                };
                current = next;
            }
        })
    }

    /// Saved state of a thread
    pub async fn get_state(&self, thread_id: &str) -> GraphResult<Option<GraphState>> {
        match &self.checkpointer {
            Some(checkpointer) => checkpointer.get(thread_id).await,
            None => Ok(None),
        }
    }

    async fn initial_state(&self, input: GraphState, config: &RunnableConfig) -> GraphResult<GraphState> {
        let (Some(checkpointer), Some(thread_id)) = (&self.checkpointer, &config.thread_id) else {
            return Ok(input);
        };

        let mut state = checkpointer.get(thread_id).await?.unwrap_or_default();
        debug!(
            graph = %self.name,
            thread_id = %thread_id,
            saved_messages = state.messages().len(),
            "Resuming thread"
        );
        state.merge(StateUpdate::from(input));
        Ok(state)
    }

    fn context(&self, config: &RunnableConfig) -> ExecutionContext {
        let ctx = ExecutionContext::new(&self.name, START).with_config(config.clone());
        match &self.memory {
            Some(memory) => ctx.with_memory(Arc::clone(memory)),
            None => ctx,
        }
    }

    /// Execute `node`, merge its update, checkpoint, and pick the next node
    async fn step(
        &self,
        node: &str,
        step: usize,
        state: &mut GraphState,
        ctx: &ExecutionContext,
        config: &RunnableConfig,
    ) -> GraphResult<String> {
        let limit = config.recursion_limit.unwrap_or(self.recursion_limit);
        if step > limit {
            return Err(GraphError::RecursionLimit { limit });
        }

        let runner = self
            .nodes
            .get(node)
            .ok_or_else(|| GraphError::NodeNotFound(node.to_string()))?;

        debug!(graph = %self.name, node = %node, step, "Executing node");
        let update = runner.execute(state, &ctx.at(node, step)).await?;
        state.merge(update);

        if let (Some(checkpointer), Some(thread_id)) = (&self.checkpointer, &config.thread_id) {
            checkpointer.put(thread_id, state).await?;
        }

        self.route(node, state)
    }

    fn route(&self, from: &str, state: &GraphState) -> GraphResult<String> {
        let edge = self
            .edges
            .get(from)
            .ok_or_else(|| GraphError::InvalidGraph(format!("node '{}' has no outgoing edge", from)))?;

        let next = match edge {
            Edge::Direct(to) => to.clone(),
            Edge::Conditional { router, mapping } => {
                let key = router(state);
                if mapping.is_empty() {
                    if key != END && !self.nodes.contains_key(&key) {
                        return Err(GraphError::NodeNotFound(key));
                    }
                    key
                } else {
                    mapping.get(&key).cloned().ok_or_else(|| GraphError::Routing {
                        node: from.to_string(),
                        key,
                    })?
                }
            }
        };

        debug!(graph = %self.name, from = %from, to = %next, "Routing");
        Ok(next)
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("name", &self.name)
            .field("nodes", &self.node_names())
            .field("recursion_limit", &self.recursion_limit)
            .field("checkpointer", &self.checkpointer.is_some())
            .finish()
    }
}
