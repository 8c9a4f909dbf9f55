//! Roles and the fixed capability hierarchy.
//!
//! ```text
//! ADMIN   → { ADMIN, ANALYST, USER }
//! ANALYST → { ANALYST, USER }
//! USER    → { USER }
//! ```
//!
//! Unknown role strings never become a [`Role`]; at the string boundary they
//! satisfy nothing and land on the public page.

use crate::constants::paths;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Account class.
///
/// Ordered by capability, so `Role::Admin > Role::Analyst > Role::User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Regular platform user.
    User,
    /// Analyst with access to analytics views.
    Analyst,
    /// Administrator.
    Admin,
}

impl Role {
    /// Every role, lowest capability first.
    pub const ALL: [Role; 3] = [Role::User, Role::Analyst, Role::Admin];

    /// Wire name (`USER`, `ANALYST`, `ADMIN`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Analyst => "ANALYST",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse a role name, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for anything outside the closed set.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Some(Self::User),
            "ANALYST" => Some(Self::Analyst),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Pure lookup over the role hierarchy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleResolver;

impl RoleResolver {
    /// Roles whose capabilities `role` includes.
    #[must_use]
    pub const fn capabilities(role: Role) -> &'static [Role] {
        match role {
            Role::Admin => &[Role::Admin, Role::Analyst, Role::User],
            Role::Analyst => &[Role::Analyst, Role::User],
            Role::User => &[Role::User],
        }
    }

    /// Returns `true` if `user_role` carries the capabilities of `required`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ipgate_auth::role::{Role, RoleResolver};
    /// assert!(RoleResolver::satisfies(Role::Admin, Role::Analyst));
    /// assert!(!RoleResolver::satisfies(Role::Analyst, Role::Admin));
    /// ```
    #[must_use]
    pub fn satisfies(user_role: Role, required: Role) -> bool {
        Self::capabilities(user_role).contains(&required)
    }

    /// String form of [`RoleResolver::satisfies`]. Fails closed: if either
    /// side is not a known role the answer is `false`.
    #[must_use]
    pub fn satisfies_raw(user_role: &str, required: &str) -> bool {
        match (Role::parse(user_role), Role::parse(required)) {
            (Some(user_role), Some(required)) => Self::satisfies(user_role, required),
            _ => false,
        }
    }

    /// Default landing path for a role.
    #[must_use]
    pub const fn dashboard_path(role: Role) -> &'static str {
        match role {
            Role::Admin => paths::ADMIN_DASHBOARD,
            Role::Analyst => paths::ANALYST_DASHBOARD,
            Role::User => paths::USER_DASHBOARD,
        }
    }

    /// String form of [`RoleResolver::dashboard_path`]; unknown roles land on
    /// the public page.
    #[must_use]
    pub fn dashboard_path_raw(role: &str) -> &'static str {
        Role::parse(role).map_or(paths::PUBLIC_LANDING, Self::dashboard_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hierarchy_table() {
        let expected = [
            (Role::Admin, [true, true, true]),
            (Role::Analyst, [true, true, false]),
            (Role::User, [true, false, false]),
        ];

        for (user_role, row) in expected {
            for (required, allowed) in Role::ALL.into_iter().zip(row) {
                assert_eq!(
                    RoleResolver::satisfies(user_role, required),
                    allowed,
                    "{user_role} vs {required}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_roles_fail_closed() {
        assert!(!RoleResolver::satisfies_raw("SUPERUSER", "USER"));
        assert!(!RoleResolver::satisfies_raw("ADMIN", "OWNER"));
        assert!(!RoleResolver::satisfies_raw("", ""));
        assert!(RoleResolver::satisfies_raw("admin", "analyst"));
    }

    #[test]
    fn test_dashboard_paths() {
        assert_eq!(RoleResolver::dashboard_path(Role::Admin), "/admin-dashboard");
        assert_eq!(RoleResolver::dashboard_path(Role::Analyst), "/analyst-dashboard");
        assert_eq!(RoleResolver::dashboard_path(Role::User), "/user-dashboard");
        assert_eq!(RoleResolver::dashboard_path_raw("GUEST"), "/");
        assert_eq!(RoleResolver::dashboard_path_raw("Analyst"), "/analyst-dashboard");
    }

    #[test]
    fn test_role_serde_rejects_unknown() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&Role::Analyst).unwrap(), "\"ANALYST\"");
        assert!(serde_json::from_str::<Role>("\"ROOT\"").is_err());
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::User), Just(Role::Analyst), Just(Role::Admin)]
    }

    proptest! {
        #[test]
        fn prop_satisfies_matches_capability_order(user_role in any_role(), required in any_role()) {
            prop_assert_eq!(RoleResolver::satisfies(user_role, required), user_role >= required);
        }

        #[test]
        fn prop_every_role_satisfies_itself(role in any_role()) {
            prop_assert!(RoleResolver::satisfies(role, role));
        }

        #[test]
        fn prop_unparseable_strings_satisfy_nothing(raw in "[a-z]{0,3}[0-9]{1,3}", required in any_role()) {
            prop_assert!(!RoleResolver::satisfies_raw(&raw, required.as_str()));
            prop_assert!(!RoleResolver::satisfies_raw(required.as_str(), &raw));
        }
    }
}
