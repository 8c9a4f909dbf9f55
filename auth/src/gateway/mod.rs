//! Backend authentication gateway.
//!
//! The gateway is the only component that talks to the backend. Every method
//! resolves to `Result<_, AuthError>`; transport failures are mapped, never
//! propagated raw.
//!
//! # Status Mapping
//!
//! | Response | Error kind |
//! |---|---|
//! | 401 | `InvalidCredentials` |
//! | other 4xx | `ValidationFailure` (server message) |
//! | 5xx | `ServerFault` |
//! | no response | `NetworkUnreachable` |

pub mod http;

pub use http::HttpAuthGateway;

use crate::error::Result;
use crate::state::{Credential, Session, User};
use crate::validation::RegisterRequest;
use serde::Deserialize;
use std::future::Future;

/// Message shown after a successful registration when the backend sends none.
pub const REGISTRATION_SUCCESS_MESSAGE: &str = "Registration successful! Please login.";

/// Outcome of a successful registration. Never carries a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfirmation {
    /// Message for the user.
    pub message: String,
}

impl Default for RegistrationConfirmation {
    fn default() -> Self {
        Self {
            message: REGISTRATION_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Backend authentication operations.
///
/// # Implementation Notes
///
/// - `login` normalizes the email (trim + lowercase) before sending
/// - `fetch_profile` maps 401 to `InvalidCredentials` and every other
///   non-transport failure to `ProfileFetchFailure`
/// - Implementations never retry
pub trait AuthGateway: Send + Sync {
    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` on 401, `ValidationFailure` on other 4xx,
    /// `ServerFault` on 5xx or a malformed body, and `NetworkUnreachable` if
    /// the backend cannot be reached.
    fn login(&self, email: &str, password: &str) -> impl Future<Output = Result<Session>> + Send;

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Same mapping as [`login`](Self::login).
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<RegistrationConfirmation>> + Send;

    /// Look up the user a credential belongs to.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` on 401, `NetworkUnreachable` if the
    /// backend cannot be reached, and `ProfileFetchFailure` otherwise.
    fn fetch_profile(
        &self,
        credential: &Credential,
        scheme: &str,
    ) -> impl Future<Output = Result<User>> + Send;

    /// Ask the backend to email a one-time login code.
    ///
    /// # Errors
    ///
    /// Same mapping as [`login`](Self::login).
    fn request_login_code(&self, email: &str) -> impl Future<Output = Result<()>> + Send;

    /// Exchange a one-time login code for a credential.
    ///
    /// # Errors
    ///
    /// Same mapping as [`login`](Self::login); an empty body is a `ServerFault`.
    fn verify_login_code(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<Credential>> + Send;
}

// ═══════════════════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════════════════

/// Login success body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub user: Option<User>,
}

/// Error body fields the backend may use.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Extract a human-readable message from an error response body.
///
/// A JSON string body is used as-is, then the `error` field, then `message`.
/// A non-JSON, non-empty body is used verbatim. Anything else falls back to
/// `Server error: <status>`.
///
/// # Examples
///
/// ```
/// use ipgate_auth::gateway::server_message;
///
/// assert_eq!(server_message(409, r#"{"error":"Email taken"}"#), "Email taken");
/// assert_eq!(server_message(400, r#""Bad code""#), "Bad code");
/// assert_eq!(server_message(500, ""), "Server error: 500");
/// ```
#[must_use]
pub fn server_message(status: u16, body: &str) -> String {
    let fallback = || format!("Server error: {status}");
    let body = body.trim();

    if body.is_empty() {
        return fallback();
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(message)) if !message.trim().is_empty() => message,
        Ok(value) => serde_json::from_value::<ErrorBody>(value)
            .ok()
            .and_then(|fields| {
                fields
                    .error
                    .filter(|m| !m.trim().is_empty())
                    .or(fields.message.filter(|m| !m.trim().is_empty()))
            })
            .unwrap_or_else(fallback),
        Err(_) => body.to_string(),
    }
}
