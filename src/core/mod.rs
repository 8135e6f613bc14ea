//! Core types shared by the graph model, the builders and the engine.
//!
//! This module contains:
//! - Identifier traits for states and events
//! - Callbacks (`Action`, `Guard`) and the errors actions report
//! - Lifecycle events and their typed payloads
//! - The per-call `Context`

mod action;
mod context;
mod guard;
mod lifecycle;
mod state;

pub use action::{Action, ActionError, ActionResult, BoxError, ChainedAction, ValidationError};
pub use context::Context;
pub use guard::Guard;
pub use lifecycle::{
    LifecycleData, LifecycleEvent, LifecyclePayload, Payload, ProcessingError, StateChange,
};
pub use state::{EventId, StateId};
