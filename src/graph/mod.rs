//! In-memory graph model: states and their outgoing transitions.
//!
//! The graph is assembled by the builders and is immutable once the machine
//! is built. Transitions refer to their target by identifier; the engine
//! resolves identifiers to nodes while executing.

mod node;
mod state_graph;
mod transition;

pub use node::StateNode;
pub use state_graph::StateGraph;
pub use transition::{ErrorMatcher, Transition, Trigger};
