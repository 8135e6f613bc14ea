//! Identifier traits for states and events.
//!
//! The engine never inspects identifiers beyond equality, hashing and a
//! display name. Callers usually implement these traits on fieldless enums,
//! either by hand or through the `state_enum!` / `event_enum!` macros.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of a state within a machine.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: states are keys of the graph
/// - `Debug`: states appear in diagnostics and log records
/// - `Serialize` + `DeserializeOwned`: states can be named in definitions
///   and carried in serialized state-change payloads
///
/// # Example
///
/// ```rust
/// use statework::core::StateId;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum OrderState {
///     New,
///     Paid,
///     Shipped,
///     Closed,
/// }
///
/// impl StateId for OrderState {
///     fn name(&self) -> &str {
///         match self {
///             Self::New => "New",
///             Self::Paid => "Paid",
///             Self::Shipped => "Shipped",
///             Self::Closed => "Closed",
///         }
///     }
/// }
///
/// assert_eq!(OrderState::Paid.name(), "Paid");
/// ```
pub trait StateId:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Name used for logging and name-based lookups.
    fn name(&self) -> &str;
}

/// Identifier of an event a machine listens to.
pub trait EventId:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Name used for logging and name-based lookups.
    fn name(&self) -> &str;
}
