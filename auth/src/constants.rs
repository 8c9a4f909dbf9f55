//! Constants shared across the session core.
//!
//! Paths mirror the host application's router; storage keys are the three
//! persisted session entries.

/// Navigation paths known to the core.
pub mod paths {
    /// Public, unauthenticated landing page.
    pub const PUBLIC_LANDING: &str = "/";

    /// Login entry point.
    pub const LOGIN: &str = "/login";

    /// Registration page.
    pub const REGISTER: &str = "/register";

    /// Landing page for `USER` accounts.
    pub const USER_DASHBOARD: &str = "/user-dashboard";

    /// Landing page for `ANALYST` accounts.
    pub const ANALYST_DASHBOARD: &str = "/analyst-dashboard";

    /// Landing page for `ADMIN` accounts.
    pub const ADMIN_DASHBOARD: &str = "/admin-dashboard";

    /// External-identity completion page.
    pub const OAUTH_SUCCESS: &str = "/oauth2-success";
}

/// Keys of the persisted session entries.
pub mod storage_keys {
    /// Bearer credential.
    pub const CREDENTIAL: &str = "accessToken";

    /// Credential scheme (e.g. `Bearer`).
    pub const CREDENTIAL_SCHEME: &str = "tokenType";

    /// JSON-serialized user profile.
    pub const USER: &str = "user";

    /// All session keys.
    pub const ALL: [&str; 3] = [CREDENTIAL, CREDENTIAL_SCHEME, USER];
}

/// The only credential scheme this core issues.
pub const BEARER_SCHEME: &str = "Bearer";

/// Query parameter carrying the credential on external-identity redirects.
pub const OAUTH_TOKEN_PARAM: &str = "token";

/// Query parameter carrying the resume destination on login redirects.
pub const REDIRECT_PARAM: &str = "redirect";

/// Query parameter carrying the role hint on outbound external-identity URLs.
pub const ROLE_HINT_PARAM: &str = "role";
