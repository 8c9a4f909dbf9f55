//! Client configuration.
//!
//! Values come from the application, optionally seeded from the environment
//! (and a `.env` file) via [`ClientConfig::from_env`].

use crate::constants::paths;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable for the API base URL.
pub const ENV_API_URL: &str = "IPGATE_API_URL";
/// Environment variable for the external-identity base URL.
pub const ENV_OAUTH_URL: &str = "IPGATE_OAUTH_URL";
/// Environment variable for the session storage directory.
pub const ENV_STORAGE_DIR: &str = "IPGATE_STORAGE_DIR";
/// Environment variable for the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "IPGATE_TIMEOUT_SECS";

/// Backend endpoint paths, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Password login.
    pub login: String,
    /// Account registration.
    pub register: String,
    /// Profile of the credential holder.
    pub profile: String,
    /// One-time-code request.
    pub request_login_code: String,
    /// One-time-code verification.
    pub verify_login_code: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".to_string(),
            register: "/auth/register".to_string(),
            profile: "/auth/me".to_string(),
            request_login_code: "/auth/request-login".to_string(),
            verify_login_code: "/auth/verify-login".to_string(),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., `http://localhost:8080/api`).
    ///
    /// Endpoints are resolved as `{api_base_url}{endpoint}`.
    pub api_base_url: String,

    /// Base URL for outbound external-identity redirects.
    ///
    /// Authorization URLs are `{oauth_base_url}/oauth2/authorization/{provider}`.
    pub oauth_base_url: String,

    /// Endpoint paths.
    pub endpoints: Endpoints,

    /// Login entry point.
    ///
    /// Default: `/login`
    pub login_path: String,

    /// Public landing page.
    ///
    /// Default: `/`
    pub public_landing_path: String,

    /// Per-request timeout.
    ///
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Directory for the persisted session, if any.
    pub storage_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Create configuration for a backend.
    ///
    /// # Arguments
    ///
    /// * `api_base_url` - API base URL (e.g., `https://ip.example.com/api`)
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Set the external-identity base URL.
    #[must_use]
    pub fn with_oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_base_url = url.into();
        self
    }

    /// Set endpoint paths.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the login entry point.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set the public landing page.
    #[must_use]
    pub fn with_public_landing_path(mut self, path: impl Into<String>) -> Self {
        self.public_landing_path = path.into();
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the session storage directory.
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// Build configuration from the environment, loading `.env` if present.
    ///
    /// Unset variables keep their defaults. An unparseable timeout is ignored
    /// with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_OAUTH_URL) {
            config.oauth_base_url = url;
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            config.storage_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.request_timeout = Duration::from_secs(secs),
                Err(e) => tracing::warn!(value = %raw, error = %e, "Ignoring invalid {ENV_TIMEOUT_SECS}"),
            }
        }

        config
    }

    /// Absolute URL for an endpoint path.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.api_base_url.trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            oauth_base_url: "http://localhost:8080".to_string(),
            endpoints: Endpoints::default(),
            login_path: paths::LOGIN.to_string(),
            public_landing_path: paths::PUBLIC_LANDING.to_string(),
            request_timeout: Duration::from_secs(10),
            storage_dir: None,
        }
    }
}
