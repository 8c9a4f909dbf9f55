//! Route requirements.
//!
//! Maps application paths to what they require. Public routes bypass the
//! guard entirely.

use crate::config::ClientConfig;
use crate::constants::paths;
use crate::role::{Role, RoleResolver};
use std::collections::BTreeMap;

/// What a route requires of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// No session needed.
    Public,
    /// Any session.
    Authenticated,
    /// A session whose role satisfies the given one.
    Role(Role),
}

impl Requirement {
    /// Role the guard must enforce, or `None` for any session.
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Role(role) => Some(role),
            Self::Public | Self::Authenticated => None,
        }
    }
}

/// Path-to-requirement table.
///
/// Lookups ignore the query string and a trailing slash.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, Requirement>,
}

impl RouteTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform's routes: landing, login, registration, the
    /// external-identity completion page, and one dashboard per role.
    #[must_use]
    pub fn standard() -> Self {
        Self::standard_for(&ClientConfig::default())
    }

    /// [`standard`](Self::standard) with the configured landing and login paths.
    #[must_use]
    pub fn standard_for(config: &ClientConfig) -> Self {
        let mut table = Self::new()
            .route(&config.public_landing_path, Requirement::Public)
            .route(&config.login_path, Requirement::Public)
            .route(paths::REGISTER, Requirement::Public)
            .route(paths::OAUTH_SUCCESS, Requirement::Public);

        for role in Role::ALL {
            table = table.route(RoleResolver::dashboard_path(role), Requirement::Role(role));
        }
        table
    }

    /// Add or replace a route.
    #[must_use]
    pub fn route(mut self, path: &str, requirement: Requirement) -> Self {
        self.routes.insert(normalize(path).to_string(), requirement);
        self
    }

    /// Requirement for `location`, or `None` if no route matches.
    #[must_use]
    pub fn requirement(&self, location: &str) -> Option<Requirement> {
        self.routes.get(normalize(location)).copied()
    }

    /// Where to go after authenticating as `role`.
    ///
    /// A requested location is honored when it is a local path the role may
    /// enter; otherwise the role's dashboard.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipgate_auth::{Role, RouteTable};
    ///
    /// let routes = RouteTable::standard();
    /// assert_eq!(routes.landing_for(Role::Admin, Some("/analyst-dashboard")), "/analyst-dashboard");
    /// assert_eq!(routes.landing_for(Role::User, Some("/admin-dashboard")), "/user-dashboard");
    /// assert_eq!(routes.landing_for(Role::User, Some("https://evil.test/")), "/user-dashboard");
    /// ```
    #[must_use]
    pub fn landing_for(&self, role: Role, requested: Option<&str>) -> String {
        let dashboard = || RoleResolver::dashboard_path(role).to_string();

        let Some(requested) = requested.filter(|r| is_local_path(r)) else {
            return dashboard();
        };

        match self.requirement(requested) {
            Some(Requirement::Role(required)) if RoleResolver::satisfies(role, required) => {
                requested.to_string()
            }
            Some(Requirement::Authenticated) => requested.to_string(),
            _ => dashboard(),
        }
    }

    /// Iterate over routes in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Requirement)> + '_ {
        self.routes.iter().map(|(path, req)| (path.as_str(), *req))
    }
}

/// Path part of a location, without query, fragment or trailing slash.
fn normalize(location: &str) -> &str {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    match path.trim_end_matches('/') {
        "" => paths::PUBLIC_LANDING,
        trimmed => trimmed,
    }
}

/// Same-origin absolute path (`/x`, not `//host` or `scheme:`).
fn is_local_path(location: &str) -> bool {
    location.starts_with('/') && !location.starts_with("//") && !location.contains('\\')
}
