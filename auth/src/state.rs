//! Session state types.
//!
//! All types are `Clone` and immutable once built; a session changes only by
//! being replaced as a whole.

use crate::constants::BEARER_SCHEME;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// Credential
// ═══════════════════════════════════════════════════════════════════════

/// Opaque bearer credential issued by the backend.
///
/// `Debug` is redacted so credentials never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential. Returns `None` for an empty or blank string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw credential, for building an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// ═══════════════════════════════════════════════════════════════════════
// User
// ═══════════════════════════════════════════════════════════════════════

/// Backend-assigned user identifier.
///
/// Kept as raw JSON so both numeric and string ids round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub serde_json::Value);

/// Authenticated user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,

    /// Display name.
    pub username: String,

    /// Login email.
    pub email: String,

    /// Account class.
    pub role: Role,
}

impl User {
    /// Build a user without a backend id.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
            role,
        }
    }

    /// Attach a backend id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<serde_json::Value>) -> Self {
        self.id = Some(UserId(id.into()));
        self
    }

    /// A user is well-formed when its username and email are non-blank.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.username.trim().is_empty() && !self.email.trim().is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════

/// A bound credential and the user it authenticates.
///
/// Only constructible fully populated, so a half-built session cannot exist.
///
/// # Examples
///
/// ```
/// # use ipgate_auth::{Credential, Role, Session, User};
/// let credential = Credential::new("abc").unwrap();
/// let session = Session::bearer(credential, User::new("Admin", "admin@test.com", Role::Admin));
/// assert_eq!(session.authorization_header(), "Bearer abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    credential: Credential,
    scheme: String,
    user: User,
}

impl Session {
    /// Build a session with an explicit scheme. A blank scheme falls back to
    /// `Bearer`.
    #[must_use]
    pub fn new(credential: Credential, scheme: impl Into<String>, user: User) -> Self {
        let scheme = scheme.into();
        let scheme = if scheme.trim().is_empty() {
            BEARER_SCHEME.to_string()
        } else {
            scheme
        };
        Self {
            credential,
            scheme,
            user,
        }
    }

    /// Build a `Bearer` session.
    #[must_use]
    pub fn bearer(credential: Credential, user: User) -> Self {
        Self::new(credential, BEARER_SCHEME, user)
    }

    /// Held credential.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Credential scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Authenticated user.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Role of the authenticated user.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.user.role
    }

    /// `Authorization` header value: `<scheme> <credential>`.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.scheme, self.credential.expose())
    }
}
