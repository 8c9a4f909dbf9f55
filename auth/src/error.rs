//! Error types for session and authorization operations.

use thiserror::Error;

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure categories. The kind, not the message, drives handling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// Wrong email/password, or a credential the backend no longer accepts.
    InvalidCredentials,

    /// Malformed client input, or input the backend rejected as invalid.
    ValidationFailure,

    /// The backend could not be reached at all.
    NetworkUnreachable,

    /// Unexpected server error or malformed success body.
    ServerFault,

    /// External-identity redirect arrived without a credential.
    MissingToken,

    /// Profile lookup after an external-identity redirect failed.
    ProfileFetchFailure,
}

impl AuthErrorKind {
    /// Stable snake-case name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::ValidationFailure => "validation_failure",
            Self::NetworkUnreachable => "network_unreachable",
            Self::ServerFault => "server_fault",
            Self::MissingToken => "missing_token",
            Self::ProfileFetchFailure => "profile_fetch_failure",
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An auth failure: a kind plus a message fit for showing to the user.
///
/// # Examples
///
/// ```
/// # use ipgate_auth::{AuthError, AuthErrorKind};
/// let err = AuthError::invalid_credentials();
/// assert_eq!(err.kind(), AuthErrorKind::InvalidCredentials);
/// assert!(err.is_user_correctable());
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    kind: AuthErrorKind,
    message: String,
}

impl AuthError {
    /// Create an error of the given kind.
    #[must_use]
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Wrong email or password.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(
            AuthErrorKind::InvalidCredentials,
            "Invalid email or password. Please try again.",
        )
    }

    /// Client-side or server-side input rejection.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::ValidationFailure, message)
    }

    /// Backend unreachable.
    #[must_use]
    pub fn network_unreachable() -> Self {
        Self::new(
            AuthErrorKind::NetworkUnreachable,
            "Cannot connect to server. Please check your connection and try again.",
        )
    }

    /// Unexpected server behaviour.
    #[must_use]
    pub fn server_fault(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::ServerFault, message)
    }

    /// External-identity redirect without a credential.
    #[must_use]
    pub fn missing_token() -> Self {
        Self::new(
            AuthErrorKind::MissingToken,
            "Social login failed. No token received.",
        )
    }

    /// Profile lookup after external-identity login failed.
    #[must_use]
    pub fn profile_fetch_failure() -> Self {
        Self::new(
            AuthErrorKind::ProfileFetchFailure,
            "Failed to fetch user profile after social login.",
        )
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the user can fix this by changing their input.
    #[must_use]
    pub const fn is_user_correctable(&self) -> bool {
        matches!(
            self.kind,
            AuthErrorKind::InvalidCredentials | AuthErrorKind::ValidationFailure
        )
    }

    /// Returns `true` if a held session must be dropped when an
    /// authenticated call fails this way.
    #[must_use]
    pub const fn clears_session(&self) -> bool {
        matches!(self.kind, AuthErrorKind::InvalidCredentials)
    }

    /// Returns `true` if the failure ends on the login entry point.
    #[must_use]
    pub const fn redirects_to_login(&self) -> bool {
        matches!(
            self.kind,
            AuthErrorKind::MissingToken | AuthErrorKind::ProfileFetchFailure
        )
    }
}
