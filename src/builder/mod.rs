//! Builder API for assembling a state machine graph.
//!
//! States, transitions and lifecycle actions are configured through
//! short-lived configurers handed to closures. Every `add()` validates what
//! it adds, so configuration defects surface before the machine runs.

pub mod error;
pub mod lifecycle;
pub mod machine;
pub mod macros;
pub mod state;
pub mod transition;

pub use error::ConfigurationError;
pub use lifecycle::LifecycleActionConfigurer;
pub use machine::StateMachineBuilder;
pub use state::StateConfigurer;
pub use transition::TransitionConfigurer;
