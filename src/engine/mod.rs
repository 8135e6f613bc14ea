//! The execution engine.
//!
//! A [`StateMachine`] resolves which transition fires for an event, runs
//! the callbacks of that transition in a fixed order, follows automatic
//! transitions and recovers from technical failures through error
//! transitions. [`DynStateMachine`] exposes the same entry points over
//! type-erased events and subjects.

mod dynamic;
mod error;
mod machine;

pub use dynamic::DynStateMachine;
pub use error::EngineError;
pub use machine::{StateAccessor, StateMachine};
