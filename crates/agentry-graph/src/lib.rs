//! # Agentry Graph
//!
//! State graph workflows in the style of LangGraph, plus sequential crews.
//!
//! - [`state`]: [`GraphState`](state::GraphState) and the
//!   [`StateUpdate`](state::StateUpdate)s nodes return
//! - [`graph`]: the [`StateGraph`](graph::StateGraph) builder and its
//!   [`CompiledGraph`](graph::CompiledGraph) executor
//! - [`prebuilt`]: model and tool nodes for assistant/tools loops
//! - [`crew`]: role-playing members working through tasks in order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agentry_graph::prelude::*;
//!
//! let graph = StateGraph::new("chatbot")
//!     .add_node("chatbot", AgentNode::new("chatbot", model))
//!     .add_edge(START, "chatbot")
//!     .add_edge("chatbot", END)
//!     .compile()?;
//!
//! let state = graph.invoke(GraphState::from_user("Hello!")).await?;
//! println!("{}", state.last_ai_text().unwrap_or_default());
//! ```

#![warn(missing_docs)]

pub mod checkpoint;
pub mod core;
pub mod crew;
pub mod error;
pub mod graph;
pub mod node;
pub mod prebuilt;
pub mod state;

pub use error::{GraphError, GraphResult};

/// Commonly used types
pub mod prelude {
    pub use crate::checkpoint::{Checkpointer, MemorySaver, StorageSaver};
    pub use crate::core::{ExecutionContext, RunnableConfig};
    pub use crate::crew::{Crew, CrewMember, CrewOutput, Process, Task, TaskOutput};
    pub use crate::error::{GraphError, GraphResult};
    pub use crate::graph::{CompiledGraph, GraphStep, StateGraph, END, START};
    pub use crate::node::{FunctionNode, Node};
    pub use crate::prebuilt::{tools_condition, AgentNode, ToolNode};
    pub use crate::state::{GraphState, StateUpdate, StateValue};
}
