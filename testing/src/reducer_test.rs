//! Given/When/Then harness for [`Reducer`]s.

#![allow(clippy::module_name_repetitions)]

use ipgate_core::{effect::Effect, reducer::Reducer};

type StateAssertion<S> = Box<dyn FnOnce(&S)>;

type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Builder that feeds actions to a reducer and checks what comes out.
///
/// Several actions may be queued with [`ReducerTest::when_action`]; they are
/// reduced in order, and effect assertions see the effects of the last one.
///
/// # Example
///
/// ```ignore
/// use ipgate_testing::ReducerTest;
///
/// ReducerTest::new(GuardReducer::new(paths))
///     .with_env(())
///     .given_state(GuardState::default())
///     .when_action(GuardAction::Navigate { .. })
///     .then_state(|state| {
///         assert_eq!(state.phase, GuardPhase::Unresolved);
///     })
///     .then_effects(|effects| {
///         assert_eq!(effects.len(), 1);
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Harness around `reducer`.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Environment passed to every `reduce` call.
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Starting state.
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Append an action.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Check the state after every action has run.
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Check the effects of the final action.
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Reduce the queued actions, then apply the checks.
    ///
    /// # Panics
    ///
    /// Panics when the state, environment or actions are missing, and when a
    /// check fails.
    #[allow(clippy::panic, clippy::expect_used)]
    pub fn run(self) {
        let mut state = self.initial_state.expect("given_state() not called");
        assert!(!self.actions.is_empty(), "when_action() not called");
        let env = self.environment.expect("with_env() not called");

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Checks over a slice of effects.
pub mod assertions {
    use ipgate_core::effect::Effect;

    /// Only [`Effect::None`] may be present.
    ///
    /// # Panics
    ///
    /// On any other effect.
    #[allow(clippy::panic)]
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "unexpected effects: {effects:?}"
        );
    }

    /// Exactly `expected` effects.
    ///
    /// # Panics
    ///
    /// On a different count.
    #[allow(clippy::panic)]
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "effect count");
    }

    /// Some effect redirects to `location`.
    ///
    /// # Panics
    ///
    /// When none does.
    #[allow(clippy::panic)]
    pub fn assert_redirects_to<A: std::fmt::Debug>(effects: &[Effect<A>], location: &str) {
        assert!(
            effects
                .iter()
                .any(|e| e.redirect_location() == Some(location)),
            "no redirect to {location} in {effects:?}"
        );
    }

    /// No effect redirects.
    ///
    /// # Panics
    ///
    /// When one does.
    #[allow(clippy::panic)]
    pub fn assert_no_redirect<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(|e| e.redirect_location().is_none()),
            "unexpected redirect in {effects:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipgate_core::effect::Effect;
    use ipgate_core::reducer::Reducer;
    use ipgate_core::{SmallVec, smallvec};

    #[derive(Clone, Debug)]
    struct TestState {
        signed_in: bool,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        SignIn,
        Visit,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::SignIn => {
                    state.signed_in = true;
                    smallvec![Effect::None]
                }
                TestAction::Visit if state.signed_in => smallvec![Effect::None],
                TestAction::Visit => smallvec![Effect::redirect("/login")],
            }
        }
    }

    #[test]
    fn test_single_action_redirects() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState { signed_in: false })
            .when_action(TestAction::Visit)
            .then_effects(|effects| {
                assertions::assert_redirects_to(effects, "/login");
            })
            .run();
    }

    #[test]
    fn test_effects_come_from_last_action() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState { signed_in: false })
            .when_action(TestAction::SignIn)
            .when_action(TestAction::Visit)
            .then_state(|state| assert!(state.signed_in))
            .then_effects(|effects| {
                assertions::assert_no_redirect(effects);
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_assertions_effects_count() {
        assertions::assert_effects_count(&[Effect::<TestAction>::None], 1);
        assertions::assert_effects_count::<TestAction>(&[], 0);
    }
}
