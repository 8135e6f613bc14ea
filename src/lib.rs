//! Statework: an embeddable state-transition engine
//!
//! Statework drives a caller-owned subject through a fixed graph of states.
//! Events select candidate transitions, guards pick at most one of them, and
//! the engine runs the transition's callbacks in a fixed order. It then
//! follows automatic transitions until none fires. Technical failures are
//! recovered through error transitions; deliberate rejections from exit
//! validators are absorbed and reported through lifecycle actions.
//!
//! # Core Concepts
//!
//! - **States and events**: caller-defined identifiers (`StateId`, `EventId`)
//! - **Transitions**: triggered by an event, by a failure, or automatically
//! - **Guards**: side-effect-free predicates; more than one passing is a
//!   configuration error
//! - **Lifecycle actions**: callbacks bound to execution phases rather than
//!   to states
//! - **Transaction boundary**: hooks that demarcate each attempted transition
//!
//! # Example
//!
//! ```rust
//! use statework::builder::StateMachineBuilder;
//! use statework::core::LifecycleEvent;
//! use statework::{event_enum, state_enum};
//!
//! state_enum! {
//!     enum OrderState { New, Placed, Paid, Shipped, Closed }
//! }
//! event_enum! {
//!     enum OrderEvent { Place, Pay }
//! }
//!
//! struct Order { state: OrderState, total: u32 }
//!
//! let machine = StateMachineBuilder::new(OrderState::New, OrderState::Closed, |o: &Order| o.state)
//!     .states(|s| {
//!         s.with_id(OrderState::Placed).add()?;
//!         s.with_id(OrderState::Paid).add()?;
//!         s.with_id(OrderState::Shipped).add()
//!     })?
//!     .transitions(|t| {
//!         t.from_initial().to(OrderState::Placed).on_event(OrderEvent::Place).add()?;
//!         t.from([OrderState::Placed])
//!             .to(OrderState::Paid)
//!             .on_event(OrderEvent::Pay)
//!             .when(|ctx| ctx.subject().total > 0)
//!             .add()?;
//!         // Paid orders ship without further input
//!         t.from([OrderState::Paid]).to(OrderState::Shipped).add()
//!     })?
//!     .lifecycle_actions(|l| {
//!         l.on(LifecycleEvent::SuccessfulStateChange)
//!             .execute_fn(|ctx| {
//!                 if let Some(change) = ctx.state_change().cloned() {
//!                     ctx.subject_mut().state = change.to;
//!                 }
//!                 Ok(())
//!             })
//!             .add()
//!     })?
//!     .build()?;
//!
//! let mut order = Order { state: OrderState::New, total: 30 };
//! machine.send_event(&OrderEvent::Place, &mut order, None)?;
//! machine.send_event(&OrderEvent::Pay, &mut order, None)?;
//! assert_eq!(order.state, OrderState::Shipped);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod core;
pub mod definition;
pub mod engine;
pub mod graph;
pub mod transaction;

// Re-export commonly used types
pub use builder::{ConfigurationError, StateMachineBuilder};
pub use crate::core::{
    Action, ActionError, Context, EventId, Guard, LifecycleEvent, StateId, ValidationError,
};
pub use engine::{DynStateMachine, EngineError, StateMachine};
pub use transaction::{NoTransaction, TransactionBoundary};
