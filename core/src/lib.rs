//! # ipgate Core
//!
//! Core traits and types shared by the ipgate session and authorization crates.
//!
//! State machines in ipgate (the navigation guard, most notably) are written as
//! reducers: pure functions that update owned state and describe the side
//! effects the host application should perform.
//!
//! ## Core Concepts
//!
//! - **State**: Owned, `Clone`-able data for one state machine
//! - **Action**: Every input the state machine reacts to
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Description of a side effect (never its execution)
//! - **Environment**: Injected, read-only dependencies
//!
//! ## Example
//!
//! ```
//! use ipgate_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct DoorState {
//!     open: bool,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum DoorAction {
//!     Knock { authorized: bool },
//! }
//!
//! struct DoorReducer;
//!
//! impl Reducer for DoorReducer {
//!     type State = DoorState;
//!     type Action = DoorAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut DoorState,
//!         action: DoorAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<DoorAction>; 4]> {
//!         match action {
//!             DoorAction::Knock { authorized: true } => {
//!                 state.open = true;
//!                 smallvec![Effect::None]
//!             }
//!             DoorAction::Knock { authorized: false } => {
//!                 smallvec![Effect::redirect("/login")]
//!             }
//!         }
//!     }
//! }
//!
//! let mut state = DoorState::default();
//! let effects = DoorReducer.reduce(&mut state, DoorAction::Knock { authorized: false }, &());
//! assert_eq!(effects[0].redirect_location(), Some("/login"));
//! assert!(!state.open);
//! ```

pub use smallvec::{SmallVec, smallvec};

/// Reducer module - The core trait for state machines
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They are deterministic and testable without any I/O.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions for the host to execute
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. The host (a router, a CLI, a
/// test) decides how to perform them.
pub mod effect {
    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can feed back into the reducer
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Move the host's navigation to another location
        Redirect {
            /// Target location (path plus optional query)
            location: String,
        },

        /// Feed an action back into the reducer
        Send(Action),
    }

    impl<Action> Effect<Action> {
        /// Build a redirect effect
        #[must_use]
        pub fn redirect(location: impl Into<String>) -> Self {
            Effect::Redirect {
                location: location.into(),
            }
        }

        /// Returns `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Target of a redirect effect, if this is one
        #[must_use]
        pub fn redirect_location(&self) -> Option<&str> {
            match self {
                Effect::Redirect { location } => Some(location),
                _ => None,
            }
        }
    }
}
