//! Declarative machine definitions.
//!
//! A [`MachineDefinition`] describes states, transitions and lifecycle
//! actions as data, referring to callbacks by name. Applying it to a
//! [`StateMachineBuilder`] resolves every name through a
//! [`CallbackRegistry`] and reports all problems of the definition at once.
//!
//! ```rust
//! use statework::builder::StateMachineBuilder;
//! use statework::definition::{CallbackRegistry, MachineDefinition};
//! use statework::{event_enum, state_enum};
//!
//! state_enum! {
//!     enum Job { Queued, Running, Finished }
//! }
//! event_enum! {
//!     enum Signal { Start }
//! }
//!
//! struct Task { job: Job, runs: u32 }
//!
//! let definition: MachineDefinition<Job, Signal> = MachineDefinition::from_json(r#"{
//!     "states": [{ "id": "Running", "on_entry": "count_run" }],
//!     "transitions": [
//!         { "from": "initial", "to": { "state": "Running" }, "on_event": "Start" }
//!     ]
//! }"#)?;
//!
//! let registry = CallbackRegistry::<Job, Signal, Task>::new().with_action_fn("count_run", |ctx| {
//!     ctx.subject_mut().runs += 1;
//!     Ok(())
//! });
//!
//! let machine = StateMachineBuilder::new(Job::Queued, Job::Finished, |t: &Task| t.job)
//!     .apply_definition(&definition, &registry)?
//!     .build()?;
//!
//! let mut task = Task { job: Job::Queued, runs: 0 };
//! machine.send_event(&Signal::Start, &mut task, None)?;
//! assert_eq!(task.runs, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod registry;

pub use registry::CallbackRegistry;

use crate::builder::{
    ConfigurationError, LifecycleActionConfigurer, StateConfigurer, StateMachineBuilder,
    TransitionConfigurer,
};
use crate::core::{EventId, LifecycleEvent, StateId};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// A state machine described as data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MachineDefinition<S: StateId, E: EventId> {
    #[serde(default)]
    pub states: Vec<StateDefinition<S>>,
    #[serde(default)]
    pub transitions: Vec<TransitionDefinition<S, E>>,
    #[serde(default)]
    pub lifecycle_actions: Vec<LifecycleActionDefinition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateDefinition<S: StateId> {
    pub id: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_entry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_validator: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionDefinition<S: StateId, E: EventId> {
    pub from: SourceSpec<S>,
    pub to: TargetSpec<S>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_event: Option<E>,
    /// Name of a registered error matcher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// `{"states": [..]}`, `{"all": {"excluding": [..]}}` or `"initial"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "snake_case")]
pub enum SourceSpec<S: StateId> {
    States(Vec<S>),
    All {
        #[serde(default)]
        excluding: Vec<S>,
    },
    Initial,
}

/// `{"state": X}`, `"self"` or `"final"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "snake_case")]
pub enum TargetSpec<S: StateId> {
    State(S),
    #[serde(rename = "self")]
    SelfState,
    Final,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleActionDefinition {
    pub on: LifecycleEvent,
    pub action: String,
}

impl<S: StateId, E: EventId> MachineDefinition<S, E> {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json)
            .map_err(|e| ConfigurationError::MalformedDefinition(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigurationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigurationError::MalformedDefinition(e.to_string()))
    }
}

impl<S: StateId, E: EventId> Default for MachineDefinition<S, E> {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            lifecycle_actions: Vec::new(),
        }
    }
}

type Check = Validation<(), NonEmptyVec<ConfigurationError>>;

fn check(result: Result<(), ConfigurationError>) -> Check {
    match result {
        Ok(()) => Validation::success(()),
        Err(error) => Validation::fail(error),
    }
}

/// Resolve an optional name, recording a failed lookup in `checks`.
fn resolve<'r, T: Clone + 'r>(
    name: Option<&str>,
    lookup: impl FnOnce(&str) -> Result<&'r T, ConfigurationError>,
    checks: &mut Vec<Check>,
) -> Result<Option<T>, ()> {
    match name.map(lookup).transpose() {
        Ok(found) => Ok(found.cloned()),
        Err(error) => {
            checks.push(Validation::fail(error));
            Err(())
        }
    }
}

impl<S: StateId, E: EventId, O: 'static> StateMachineBuilder<S, E, O> {
    /// Apply a declarative definition.
    ///
    /// States are registered first, then transitions, then lifecycle
    /// actions. Every entry is checked; if any fails, the returned
    /// `InvalidDefinition` lists all failures.
    pub fn apply_definition(
        mut self,
        definition: &MachineDefinition<S, E>,
        registry: &CallbackRegistry<S, E, O>,
    ) -> Result<Self, ConfigurationError> {
        let mut checks: Vec<Check> = Vec::new();

        let mut states = StateConfigurer::new(self.graph_mut());
        for state in &definition.states {
            let on_entry = resolve(state.on_entry.as_deref(), |n| registry.action(n), &mut checks);
            let exit_validator =
                resolve(state.exit_validator.as_deref(), |n| registry.action(n), &mut checks);

            // Register the id even when a callback is missing, so transitions
            // naming this state report only the missing callback.
            states.with_id(state.id.clone());
            if let Ok(Some(action)) = on_entry {
                states.on_entry(action);
            }
            if let Ok(Some(action)) = exit_validator {
                states.exit_validator(action);
            }
            checks.push(check(states.add()));
        }

        let mut transitions = TransitionConfigurer::new(self.graph_mut());
        for transition in &definition.transitions {
            let guard = resolve(transition.guard.as_deref(), |n| registry.guard(n), &mut checks);
            let action = resolve(transition.action.as_deref(), |n| registry.action(n), &mut checks);
            let matcher = resolve(
                transition.on_error.as_deref(),
                |n| registry.error_matcher(n),
                &mut checks,
            );
            let (Ok(guard), Ok(action), Ok(matcher)) = (guard, action, matcher) else {
                continue;
            };

            match &transition.from {
                SourceSpec::States(sources) => transitions.from(sources.iter().cloned()),
                SourceSpec::All { excluding } => {
                    transitions.from_all().excluding(excluding.iter().cloned())
                }
                SourceSpec::Initial => transitions.from_initial(),
            };
            match &transition.to {
                TargetSpec::State(target) => transitions.to(target.clone()),
                TargetSpec::SelfState => transitions.to_self(),
                TargetSpec::Final => transitions.to_final(),
            };
            if let Some(event) = &transition.on_event {
                transitions.on_event(event.clone());
            }
            if let Some(matcher) = matcher {
                transitions.on_error_matching(matcher);
            }
            if let Some(guard) = guard {
                transitions.guard(guard);
            }
            if let Some(action) = action {
                transitions.action(action);
            }
            checks.push(check(transitions.add()));
        }

        let mut lifecycle = LifecycleActionConfigurer::new(self.lifecycle_actions_mut());
        for entry in &definition.lifecycle_actions {
            let Ok(Some(action)) = resolve(Some(entry.action.as_str()), |n| registry.action(n), &mut checks)
            else {
                continue;
            };
            checks.push(check(lifecycle.on(entry.on).execute(action).add()));
        }

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(()) => {
                tracing::debug!(
                    states = definition.states.len(),
                    transitions = definition.transitions.len(),
                    "Machine definition applied"
                );
                Ok(self)
            }
            Validation::Failure(errors) => Err(ConfigurationError::InvalidDefinition {
                errors: errors.iter().cloned().collect(),
            }),
        }
    }
}
