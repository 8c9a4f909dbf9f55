//! External-identity (OAuth2) login completion.
//!
//! # Flow
//!
//! ```text
//! 1. authorization_url(provider, role) → browser leaves for the provider
//! 2. Provider → backend → redirect to /oauth2-success?token=<credential>
//! 3. complete(redirect_url):
//!      no token        → MissingToken, back to login
//!      fetch_profile ok → SessionStore::set, go to the role's dashboard
//!      fetch_profile err → credential discarded, back to login
//! ```

use crate::config::ClientConfig;
use crate::constants::{BEARER_SCHEME, OAUTH_TOKEN_PARAM, ROLE_HINT_PARAM};
use crate::error::{AuthError, Result};
use crate::gateway::AuthGateway;
use crate::role::{Role, RoleResolver};
use crate::session_store::SessionStore;
use crate::state::{Credential, Session};
use crate::storage::SessionStorage;
use reqwest::Url;
use std::sync::Arc;

/// Outcome of a completion attempt.
///
/// Always carries a redirect: the dashboard on success, the login entry
/// point on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthOutcome {
    /// Where to send the user next.
    pub redirect: String,
    /// Committed session, or the failure to show on the login page.
    pub result: Result<Session>,
}

/// Completes external-identity redirects.
pub struct OAuthCompletionHandler<G, S> {
    gateway: Arc<G>,
    store: Arc<SessionStore<S>>,
    config: ClientConfig,
}

impl<G: AuthGateway, S: SessionStorage> OAuthCompletionHandler<G, S> {
    /// Create a handler.
    #[must_use]
    pub const fn new(gateway: Arc<G>, store: Arc<SessionStore<S>>, config: ClientConfig) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    /// Complete a login from the inbound redirect URL (or just its query).
    ///
    /// A session is committed only once the profile lookup succeeds.
    pub async fn complete(&self, redirect_url: &str) -> OAuthOutcome {
        let Some(credential) = extract_token(redirect_url) else {
            tracing::warn!("External-identity redirect carried no token");
            return self.fail(AuthError::missing_token());
        };

        self.complete_with_credential(credential).await
    }

    /// Complete a login from an already extracted credential.
    pub async fn complete_with_credential(&self, credential: Credential) -> OAuthOutcome {
        // Provisional until the profile resolves; dropped on failure.
        let user = match self
            .gateway
            .fetch_profile(&credential, BEARER_SCHEME)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(kind = %e.kind(), error = %e, "Profile lookup after external login failed");
                return self.fail(AuthError::profile_fetch_failure());
            }
        };

        let session = Session::bearer(credential, user);
        self.store.set(session.clone()).await;

        OAuthOutcome {
            redirect: RoleResolver::dashboard_path(session.role()).to_string(),
            result: Ok(session),
        }
    }

    fn fail(&self, error: AuthError) -> OAuthOutcome {
        OAuthOutcome {
            redirect: self.config.login_path.clone(),
            result: Err(error),
        }
    }
}

/// Outbound URL that starts an external-identity login.
///
/// `{oauth_base_url}/oauth2/authorization/{provider}?role=<ROLE>`
///
/// # Examples
///
/// ```
/// use ipgate_auth::{ClientConfig, Role};
/// use ipgate_auth::oauth::authorization_url;
///
/// let config = ClientConfig::default();
/// assert_eq!(
///     authorization_url(&config, "google", Some(Role::Analyst)),
///     "http://localhost:8080/oauth2/authorization/google?role=ANALYST"
/// );
/// ```
#[must_use]
pub fn authorization_url(config: &ClientConfig, provider: &str, role_hint: Option<Role>) -> String {
    let base = format!(
        "{}/oauth2/authorization/{}",
        config.oauth_base_url.trim_end_matches('/'),
        provider.trim().to_lowercase()
    );

    match role_hint {
        Some(role) => format!("{base}?{ROLE_HINT_PARAM}={}", role.as_str()),
        None => base,
    }
}

/// Pull the credential out of a redirect URL or bare query string.
fn extract_token(redirect_url: &str) -> Option<Credential> {
    let query = match Url::parse(redirect_url) {
        Ok(url) => url.query().map(str::to_string),
        // Relative location or bare query
        Err(_) => {
            let query = redirect_url.split_once('?').map_or(redirect_url, |(_, q)| q);
            Some(query.split('#').next().unwrap_or_default().to_string())
        }
    }?;

    serde_urlencoded::from_str::<Vec<(String, String)>>(&query)
        .ok()?
        .into_iter()
        .find(|(key, _)| key == OAUTH_TOKEN_PARAM)
        .and_then(|(_, value)| Credential::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_forms() {
        let expose = |raw: &str| extract_token(raw).map(|c| c.expose().to_string());

        assert_eq!(
            expose("http://localhost:5173/oauth2-success?token=abc.def"),
            Some("abc.def".to_string())
        );
        assert_eq!(expose("/oauth2-success?x=1&token=t%2B1"), Some("t+1".to_string()));
        assert_eq!(expose("token=raw"), Some("raw".to_string()));
        assert_eq!(expose("/oauth2-success?token="), None);
        assert_eq!(expose("/oauth2-success"), None);
        assert_eq!(expose("http://localhost/oauth2-success?other=1"), None);
    }

    #[test]
    fn test_authorization_url_without_hint() {
        let config = ClientConfig::default().with_oauth_base_url("https://ip.example.com/");
        assert_eq!(
            authorization_url(&config, "GitHub", None),
            "https://ip.example.com/oauth2/authorization/github"
        );
    }
}
