//! Per-navigation access guard.
//!
//! # State Machine
//!
//! ```text
//!              Navigate (restoration pending)
//!   ┌──────────────────────────────┐
//!   │                              ▼
//!   │  RestorationCompleted   ┌──────────┐
//!   │ ┌───────────────────────│Unresolved│
//!   │ ▼                       └──────────┘
//! ┌────────┐  Evaluate   ┌─────────────────────────┐
//! │Checking│────────────▶│ Allowed                 │
//! └────────┘             │ DeniedUnauthenticated   │ → Redirect(login?redirect=…)
//!   ▲                    │ DeniedInsufficientRole  │ → Redirect(dashboard)
//!   │                    └─────────────────────────┘
//!   └── Navigate (restoration complete)
//! ```
//!
//! [`GuardReducer`] is pure; [`AccessGuard`] drives it against a
//! [`SessionStore`]. No decision is made while restoration is pending.

use crate::config::ClientConfig;
use crate::constants::{REDIRECT_PARAM, paths};
use crate::role::{Role, RoleResolver};
use crate::session_store::SessionStore;
use crate::state::Session;
use crate::storage::SessionStorage;
use ipgate_core::effect::Effect;
use ipgate_core::reducer::Reducer;
use ipgate_core::{SmallVec, smallvec};
use std::collections::VecDeque;
use std::sync::Arc;

/// Phase of one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardPhase {
    /// Session restoration has not finished.
    #[default]
    Unresolved,
    /// Waiting for the session snapshot to evaluate.
    Checking,
    /// Navigation may proceed.
    Allowed,
    /// No session; sent to login.
    DeniedUnauthenticated,
    /// Session role too low; sent to the user's dashboard.
    DeniedInsufficientRole,
}

impl GuardPhase {
    /// Returns `true` until a decision is reached.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Unresolved | Self::Checking)
    }
}

/// State of one navigation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardState {
    /// Current phase.
    pub phase: GuardPhase,
    /// Requested location.
    pub destination: String,
    /// Role the destination requires; `None` means any session.
    pub required_role: Option<Role>,
}

/// Inputs to the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    /// Start a navigation attempt, discarding any previous one.
    Navigate {
        /// Requested location.
        destination: String,
        /// Role the destination requires.
        required_role: Option<Role>,
        /// Whether session restoration has already completed.
        restored: bool,
    },

    /// Session restoration finished.
    RestorationCompleted {
        /// Restored session, if any.
        session: Option<Session>,
    },

    /// Decide against a session snapshot.
    Evaluate {
        /// Current session, if any.
        session: Option<Session>,
    },
}

/// Guard reducer.
#[derive(Debug, Clone)]
pub struct GuardReducer {
    /// Login entry point used for unauthenticated redirects.
    pub login_path: String,
    /// Fallback when a denial carries no redirect.
    pub landing_path: String,
}

impl GuardReducer {
    /// Create a guard that sends unauthenticated users to `login_path`.
    #[must_use]
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            landing_path: paths::PUBLIC_LANDING.to_string(),
        }
    }

    /// Guard using the configured login and landing paths.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.login_path.clone()).with_landing_path(config.public_landing_path.clone())
    }

    /// Set the fallback landing path.
    #[must_use]
    pub fn with_landing_path(mut self, path: impl Into<String>) -> Self {
        self.landing_path = path.into();
        self
    }

    /// `login_path?redirect=<destination>`, form-encoded.
    #[must_use]
    pub fn login_redirect(&self, destination: &str) -> String {
        match serde_urlencoded::to_string(&[(REDIRECT_PARAM, destination)]) {
            Ok(query) => format!("{}?{query}", self.login_path),
            Err(_) => self.login_path.clone(),
        }
    }

    fn decide(
        &self,
        state: &mut GuardState,
        session: Option<&Session>,
    ) -> SmallVec<[Effect<GuardAction>; 4]> {
        let Some(session) = session else {
            state.phase = GuardPhase::DeniedUnauthenticated;
            return smallvec![Effect::redirect(self.login_redirect(&state.destination))];
        };

        match state.required_role {
            Some(required) if !RoleResolver::satisfies(session.role(), required) => {
                state.phase = GuardPhase::DeniedInsufficientRole;
                smallvec![Effect::redirect(RoleResolver::dashboard_path(session.role()))]
            }
            _ => {
                state.phase = GuardPhase::Allowed;
                smallvec![Effect::None]
            }
        }
    }
}

impl Default for GuardReducer {
    fn default() -> Self {
        Self::new(paths::LOGIN)
    }
}

impl Reducer for GuardReducer {
    type State = GuardState;
    type Action = GuardAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut GuardState,
        action: GuardAction,
        _env: &(),
    ) -> SmallVec<[Effect<GuardAction>; 4]> {
        match action {
            GuardAction::Navigate {
                destination,
                required_role,
                restored,
            } => {
                *state = GuardState {
                    phase: if restored {
                        GuardPhase::Checking
                    } else {
                        GuardPhase::Unresolved
                    },
                    destination,
                    required_role,
                };
                smallvec![Effect::None]
            }

            GuardAction::RestorationCompleted { session } => {
                if state.phase != GuardPhase::Unresolved {
                    return smallvec![Effect::None];
                }
                state.phase = GuardPhase::Checking;
                smallvec![Effect::Send(GuardAction::Evaluate { session })]
            }

            GuardAction::Evaluate { session } => {
                // Decisions are only made from Checking
                if state.phase != GuardPhase::Checking {
                    return smallvec![Effect::None];
                }
                self.decide(state, session.as_ref())
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Driver
// ═══════════════════════════════════════════════════════════════════════

/// Why a navigation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No session.
    Unauthenticated,
    /// Role does not satisfy the destination.
    InsufficientRole,
}

/// Result of guarding one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Restoration still running; show a neutral loading state.
    Checking,
    /// Proceed to the destination.
    Allowed,
    /// Go to `location` instead.
    Redirect {
        /// Replacement location.
        location: String,
        /// Reason for the redirect.
        denial: Denial,
    },
}

impl AccessDecision {
    /// Returns `true` for [`AccessDecision::Allowed`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Redirect target, if any.
    #[must_use]
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Runs [`GuardReducer`] against a shared [`SessionStore`].
pub struct AccessGuard<S> {
    store: Arc<SessionStore<S>>,
    reducer: GuardReducer,
}

impl<S: SessionStorage> AccessGuard<S> {
    /// Create a guard over `store`.
    #[must_use]
    pub const fn new(store: Arc<SessionStore<S>>, reducer: GuardReducer) -> Self {
        Self { store, reducer }
    }

    /// The reducer this guard runs.
    #[must_use]
    pub const fn reducer(&self) -> &GuardReducer {
        &self.reducer
    }

    /// Decide without waiting.
    ///
    /// Returns [`AccessDecision::Checking`] while restoration is pending.
    #[must_use]
    pub fn check(&self, destination: &str, required_role: Option<Role>) -> AccessDecision {
        let mut state = GuardState::default();
        let restored = self.store.is_restored();
        self.run(&mut state, navigate(destination, required_role, restored));

        let redirect = if restored {
            self.run(
                &mut state,
                GuardAction::Evaluate {
                    session: self.store.current(),
                },
            )
        } else {
            None
        };

        self.finish(&state, redirect)
    }

    /// Decide, waiting for restoration if it is still running.
    pub async fn resolve(&self, destination: &str, required_role: Option<Role>) -> AccessDecision {
        let mut state = GuardState::default();
        let restored = self.store.is_restored();
        self.run(&mut state, navigate(destination, required_role, restored));

        let redirect = if restored {
            self.run(
                &mut state,
                GuardAction::Evaluate {
                    session: self.store.current(),
                },
            )
        } else {
            tracing::debug!(destination, "Waiting for session restoration");
            self.store.wait_restored().await;
            self.run(
                &mut state,
                GuardAction::RestorationCompleted {
                    session: self.store.current(),
                },
            )
        };

        let decision = self.finish(&state, redirect);
        tracing::debug!(destination, ?decision, "Navigation guarded");
        decision
    }

    /// Reduce `action` and everything it sends; return the last redirect.
    fn run(&self, state: &mut GuardState, action: GuardAction) -> Option<String> {
        let mut queue = VecDeque::from([action]);
        let mut redirect = None;

        while let Some(action) = queue.pop_front() {
            for effect in self.reducer.reduce(state, action, &()) {
                match effect {
                    Effect::None => {}
                    Effect::Redirect { location } => redirect = Some(location),
                    Effect::Send(next) => queue.push_back(next),
                }
            }
        }

        redirect
    }

    fn finish(&self, state: &GuardState, redirect: Option<String>) -> AccessDecision {
        let denial = match state.phase {
            GuardPhase::Unresolved | GuardPhase::Checking => return AccessDecision::Checking,
            GuardPhase::Allowed => return AccessDecision::Allowed,
            GuardPhase::DeniedUnauthenticated => Denial::Unauthenticated,
            GuardPhase::DeniedInsufficientRole => Denial::InsufficientRole,
        };

        AccessDecision::Redirect {
            location: redirect.unwrap_or_else(|| self.reducer.landing_path.clone()),
            denial,
        }
    }
}

fn navigate(destination: &str, required_role: Option<Role>, restored: bool) -> GuardAction {
    GuardAction::Navigate {
        destination: destination.to_string(),
        required_role,
        restored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Credential, User};
    use ipgate_testing::{ReducerTest, assertions};

    fn session(role: Role) -> Session {
        Session::bearer(
            Credential::new("t").unwrap(),
            User::new("Tester", "tester@test.com", role),
        )
    }

    fn checking(destination: &str, required_role: Option<Role>) -> GuardState {
        GuardState {
            phase: GuardPhase::Checking,
            destination: destination.to_string(),
            required_role,
        }
    }

    #[test]
    fn test_navigate_before_restoration_is_unresolved() {
        ReducerTest::new(GuardReducer::default())
            .with_env(())
            .given_state(GuardState::default())
            .when_action(navigate("/admin-dashboard", Some(Role::Admin), false))
            .then_state(|state| {
                assert_eq!(state.phase, GuardPhase::Unresolved);
                assert_eq!(state.destination, "/admin-dashboard");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_evaluate_while_unresolved_is_ignored() {
        ReducerTest::new(GuardReducer::default())
            .with_env(())
            .given_state(GuardState::default())
            .when_action(navigate("/user-dashboard", Some(Role::User), false))
            .when_action(GuardAction::Evaluate {
                session: Some(session(Role::Admin)),
            })
            .then_state(|state| assert_eq!(state.phase, GuardPhase::Unresolved))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_restoration_completed_sends_evaluate() {
        let restored = Some(session(Role::User));
        let expected = GuardAction::Evaluate {
            session: restored.clone(),
        };

        ReducerTest::new(GuardReducer::default())
            .with_env(())
            .given_state(GuardState::default())
            .when_action(navigate("/user-dashboard", Some(Role::User), false))
            .when_action(GuardAction::RestorationCompleted { session: restored })
            .then_state(|state| assert_eq!(state.phase, GuardPhase::Checking))
            .then_effects(move |effects| {
                assert_eq!(effects, [Effect::Send(expected)]);
            })
            .run();
    }

    #[test]
    fn test_unauthenticated_redirects_to_login_with_destination() {
        ReducerTest::new(GuardReducer::default())
            .with_env(())
            .given_state(checking("/analyst-dashboard", Some(Role::Analyst)))
            .when_action(GuardAction::Evaluate { session: None })
            .then_state(|state| assert_eq!(state.phase, GuardPhase::DeniedUnauthenticated))
            .then_effects(|effects| {
                assertions::assert_redirects_to(effects, "/login?redirect=%2Fanalyst-dashboard");
            })
            .run();
    }

    #[test]
    fn test_insufficient_role_redirects_to_own_dashboard() {
        ReducerTest::new(GuardReducer::default())
            .with_env(())
            .given_state(checking("/admin-dashboard", Some(Role::Admin)))
            .when_action(GuardAction::Evaluate {
                session: Some(session(Role::Analyst)),
            })
            .then_state(|state| assert_eq!(state.phase, GuardPhase::DeniedInsufficientRole))
            .then_effects(|effects| {
                assertions::assert_redirects_to(effects, "/analyst-dashboard");
            })
            .run();
    }

    #[test]
    fn test_higher_role_allowed() {
        ReducerTest::new(GuardReducer::default())
            .with_env(())
            .given_state(checking("/analyst-dashboard", Some(Role::Analyst)))
            .when_action(GuardAction::Evaluate {
                session: Some(session(Role::Admin)),
            })
            .then_state(|state| assert_eq!(state.phase, GuardPhase::Allowed))
            .then_effects(assertions::assert_no_redirect)
            .run();
    }

    #[test]
    fn test_any_session_satisfies_no_role() {
        ReducerTest::new(GuardReducer::default())
            .with_env(())
            .given_state(checking("/profile", None))
            .when_action(GuardAction::Evaluate {
                session: Some(session(Role::User)),
            })
            .then_state(|state| assert_eq!(state.phase, GuardPhase::Allowed))
            .run();
    }

    #[test]
    fn test_from_config_uses_configured_paths() {
        let config = ClientConfig::default()
            .with_login_path("/signin")
            .with_public_landing_path("/home");
        let reducer = GuardReducer::from_config(&config);

        assert_eq!(reducer.landing_path, "/home");
        ReducerTest::new(reducer)
            .with_env(())
            .given_state(checking("/user-dashboard", Some(Role::User)))
            .when_action(GuardAction::Evaluate { session: None })
            .then_effects(|effects| {
                assertions::assert_redirects_to(effects, "/signin?redirect=%2Fuser-dashboard");
            })
            .run();
    }

    #[test]
    fn test_login_redirect_encodes_query() {
        let reducer = GuardReducer::new("/signin");
        assert_eq!(
            reducer.login_redirect("/search?q=a b&page=2"),
            "/signin?redirect=%2Fsearch%3Fq%3Da+b%26page%3D2"
        );
    }
}
