//! Auth service: the entry points a host application calls.
//!
//! Ties the gateway to the session store. The store is only ever written
//! after the backend has fully vouched for a credential and its user.

use crate::config::ClientConfig;
use crate::constants::BEARER_SCHEME;
use crate::error::Result;
use crate::gateway::{AuthGateway, RegistrationConfirmation};
use crate::guard::{AccessDecision, AccessGuard, GuardReducer};
use crate::oauth::{OAuthCompletionHandler, OAuthOutcome};
use crate::routes::{Requirement, RouteTable};
use crate::session_store::SessionStore;
use crate::state::Session;
use crate::storage::SessionStorage;
use crate::validation::{self, LoginForm, RegistrationForm};
use std::sync::Arc;

/// A committed login and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The session now held by the store.
    pub session: Session,
    /// Landing location for the session's role.
    pub landing: String,
}

/// Auth service.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> ipgate_auth::Result<()> {
/// use ipgate_auth::{AuthService, ClientConfig, HttpAuthGateway, LoginForm, SessionStore};
/// use ipgate_auth::storage::FileStorage;
/// use std::sync::Arc;
///
/// let config = ClientConfig::from_env();
/// let gateway = Arc::new(HttpAuthGateway::new(config.clone())?);
/// let store = Arc::new(SessionStore::new(FileStorage::new("/tmp/ipgate")));
/// store.init().await;
///
/// let service = AuthService::new(gateway, store, config);
/// let outcome = service
///     .login(&LoginForm::new("admin@test.com", "admin"), None)
///     .await?;
/// println!("go to {}", outcome.landing);
/// # Ok(())
/// # }
/// ```
pub struct AuthService<G, S> {
    gateway: Arc<G>,
    store: Arc<SessionStore<S>>,
    routes: RouteTable,
    config: ClientConfig,
}

impl<G: AuthGateway, S: SessionStorage> AuthService<G, S> {
    /// Create a service over the standard route table for `config`.
    #[must_use]
    pub fn new(gateway: Arc<G>, store: Arc<SessionStore<S>>, config: ClientConfig) -> Self {
        Self {
            gateway,
            store,
            routes: RouteTable::standard_for(&config),
            config,
        }
    }

    /// Replace the route table.
    #[must_use]
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Shared session store.
    #[must_use]
    pub const fn store(&self) -> &Arc<SessionStore<S>> {
        &self.store
    }

    /// Route table.
    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Access guard over this service's store.
    #[must_use]
    pub fn guard(&self) -> AccessGuard<S> {
        AccessGuard::new(
            Arc::clone(&self.store),
            GuardReducer::from_config(&self.config),
        )
    }

    /// External-identity completion handler over this service's store.
    #[must_use]
    pub fn oauth(&self) -> OAuthCompletionHandler<G, S> {
        OAuthCompletionHandler::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.store),
            self.config.clone(),
        )
    }

    /// Log in with email and password.
    ///
    /// `redirect` is the location the user originally asked for; it is
    /// honored if the new session may enter it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` without calling the backend if the form is
    /// invalid, otherwise the gateway's error. A failed login leaves any
    /// existing session untouched.
    pub async fn login(&self, form: &LoginForm, redirect: Option<&str>) -> Result<LoginOutcome> {
        form.validate()?;

        let session = self
            .gateway
            .login(&form.email, &form.password)
            .await
            .inspect_err(|e| {
                tracing::info!(kind = %e.kind(), email = %validation::normalize_email(&form.email), "Login failed");
            })?;

        Ok(self.commit(session, redirect).await)
    }

    /// Register an account. Never creates a session.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` without calling the backend if the form is
    /// invalid, otherwise the gateway's error.
    pub async fn register(&self, form: &RegistrationForm) -> Result<RegistrationConfirmation> {
        let request = form.validate()?;
        let confirmation = self.gateway.register(&request).await?;
        tracing::info!(email = %request.email, role = %request.role, "Account registered");
        Ok(confirmation)
    }

    /// Ask the backend to email a one-time login code.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` for a malformed email, otherwise the
    /// gateway's error.
    pub async fn request_login_code(&self, email: &str) -> Result<()> {
        validation::validate_code_request(email)?;
        self.gateway.request_login_code(email).await?;
        tracing::info!(email = %validation::normalize_email(email), "Login code requested");
        Ok(())
    }

    /// Log in with a one-time code.
    ///
    /// The returned credential is resolved to a user before anything is
    /// committed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` for malformed input, otherwise the
    /// gateway's error from verification or profile lookup.
    pub async fn login_with_code(
        &self,
        email: &str,
        code: &str,
        redirect: Option<&str>,
    ) -> Result<LoginOutcome> {
        validation::validate_code_login(email, code)?;

        let credential = self.gateway.verify_login_code(email, code).await?;
        let user = self
            .gateway
            .fetch_profile(&credential, BEARER_SCHEME)
            .await?;

        Ok(self.commit(Session::bearer(credential, user), redirect).await)
    }

    /// Complete an external-identity redirect.
    pub async fn complete_oauth(&self, redirect_url: &str) -> OAuthOutcome {
        self.oauth().complete(redirect_url).await
    }

    /// Drop the session from memory and storage.
    pub async fn logout(&self) {
        self.store.clear().await;
    }

    /// Re-check the held credential against the backend.
    ///
    /// A rejected credential clears the session; a changed profile replaces
    /// it. Neither applies if the session was cleared or replaced while the
    /// backend was consulted. Returns the session held afterwards.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error. Only `InvalidCredentials` changes the
    /// session.
    pub async fn revalidate(&self) -> Result<Option<Session>> {
        let Some(session) = self.store.current() else {
            return Ok(None);
        };

        match self
            .gateway
            .fetch_profile(session.credential(), session.scheme())
            .await
        {
            Ok(user) if &user == session.user() => Ok(self.store.current()),
            Ok(user) => {
                let refreshed =
                    Session::new(session.credential().clone(), session.scheme(), user);
                if self
                    .store
                    .replace_if(session.credential(), refreshed)
                    .await
                {
                    tracing::info!(email = %session.user().email, "Profile changed");
                }
                Ok(self.store.current())
            }
            Err(e) => {
                if e.clears_session() && self.store.clear_if(session.credential()).await {
                    tracing::warn!("Credential rejected by backend; session cleared");
                }
                Err(e)
            }
        }
    }

    /// Called when any authenticated request comes back 401.
    pub async fn handle_unauthorized(&self) {
        if self.store.is_authenticated() {
            tracing::warn!("Credential rejected by backend; clearing session");
        }
        self.store.clear().await;
    }

    /// Guard a navigation to `location` using the route table.
    ///
    /// Public routes are allowed without consulting the session. Returns
    /// `None` for unknown routes.
    pub async fn navigate(&self, location: &str) -> Option<AccessDecision> {
        let requirement = self.routes.requirement(location)?;
        if requirement == Requirement::Public {
            return Some(AccessDecision::Allowed);
        }
        Some(
            self.guard()
                .resolve(location, requirement.required_role())
                .await,
        )
    }

    async fn commit(&self, session: Session, redirect: Option<&str>) -> LoginOutcome {
        let landing = self.routes.landing_for(session.role(), redirect);
        self.store.set(session.clone()).await;
        LoginOutcome { session, landing }
    }
}
