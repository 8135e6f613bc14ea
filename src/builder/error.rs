//! Configuration errors for machine builders and definitions.

use thiserror::Error;

/// Defects in the configured graph.
///
/// Raised while building a machine and, for [`AmbiguousTransition`] and
/// [`UnknownState`], while executing it. Configuration errors are never
/// routed to an error transition.
///
/// [`AmbiguousTransition`]: ConfigurationError::AmbiguousTransition
/// [`UnknownState`]: ConfigurationError::UnknownState
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("State id not specified. Call .with_id(state) before .add()")]
    MissingStateId,

    #[error("State '{0}' is registered more than once")]
    DuplicateState(String),

    #[error("State '{0}' is not registered")]
    UnknownState(String),

    #[error("Transition source not specified. Call .from(..), .from_all() or .from_initial()")]
    MissingSource,

    #[error("Transition target not specified. Call .to(state), .to_self() or .to_final()")]
    MissingTarget,

    #[error("A transition is triggered either by an event or by an error, not both")]
    ConflictingTriggers,

    #[error("Final state '{0}' cannot have outgoing transitions")]
    TransitionFromFinal(String),

    #[error("Initial state '{0}' cannot be the target of a transition")]
    TransitionToInitial(String),

    #[error("Initial and final state must differ, both are '{0}'")]
    InitialIsFinal(String),

    #[error("Lifecycle event not specified. Call .on(event) before .add()")]
    MissingLifecycleEvent,

    #[error("Lifecycle action not specified. Call .execute(action) before .add()")]
    MissingLifecycleAction,

    #[error("{passing} transitions out of state '{state}' passed their guards")]
    AmbiguousTransition { state: String, passing: usize },

    #[error("No {kind} registered under the name '{name}'")]
    UnknownCallback { kind: &'static str, name: String },

    #[error("Malformed machine definition: {0}")]
    MalformedDefinition(String),

    #[error("Machine definition has {} problem(s): {}", errors.len(), render(errors))]
    InvalidDefinition { errors: Vec<ConfigurationError> },
}

fn render(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_transition_names_state_and_count() {
        let error = ConfigurationError::AmbiguousTransition {
            state: "Open".into(),
            passing: 2,
        };
        assert_eq!(
            error.to_string(),
            "2 transitions out of state 'Open' passed their guards"
        );
    }

    #[test]
    fn invalid_definition_lists_every_problem() {
        let error = ConfigurationError::InvalidDefinition {
            errors: vec![
                ConfigurationError::UnknownState("Ghost".into()),
                ConfigurationError::UnknownCallback {
                    kind: "guard",
                    name: "is_paid".into(),
                },
            ],
        };
        let message = error.to_string();

        assert!(message.starts_with("Machine definition has 2 problem(s)"));
        assert!(message.contains("State 'Ghost' is not registered"));
        assert!(message.contains("No guard registered under the name 'is_paid'"));
    }
}
