//! Macros for ergonomic identifier definitions.

/// Generate a state enum together with its `StateId` implementation.
///
/// The generated enum derives everything `StateId` requires; `name()`
/// returns the variant name.
///
/// # Example
///
/// ```
/// use statework::core::StateId;
/// use statework::state_enum;
///
/// state_enum! {
///     pub enum OrderState {
///         None,
///         Open,
///         Paid,
///         Concluded,
///     }
/// }
///
/// assert_eq!(OrderState::Paid.name(), "Paid");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::StateId for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

/// Generate an event enum together with its `EventId` implementation.
///
/// # Example
///
/// ```
/// use statework::core::EventId;
/// use statework::event_enum;
///
/// event_enum! {
///     pub enum OrderEvent {
///         Pay,
///         Ship,
///     }
/// }
///
/// assert_eq!(OrderEvent::Ship.name(), "Ship");
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::EventId for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
