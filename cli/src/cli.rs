//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use ipgate_auth::Role;
use ipgate_auth::config::{ENV_API_URL, ENV_OAUTH_URL, ENV_STORAGE_DIR};
use std::path::PathBuf;

/// ipgate - session client for the IP intelligence platform
#[derive(Parser, Debug)]
#[command(name = "ipgate", version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = ENV_API_URL, global = true)]
    pub api_url: Option<String>,

    /// Base URL for external-identity logins
    #[arg(long, env = ENV_OAUTH_URL, global = true)]
    pub oauth_url: Option<String>,

    /// Directory holding the persisted session
    #[arg(long, env = ENV_STORAGE_DIR, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in with email and password
    Login(LoginArgs),

    /// Create an account
    Register(RegisterArgs),

    /// Drop the stored session
    Logout,

    /// Show the stored session
    Whoami {
        /// Re-check the credential against the backend first
        #[arg(long)]
        revalidate: bool,
    },

    /// Decide whether the stored session may open a path
    Check {
        /// Application path, e.g. /admin-dashboard
        path: String,
    },

    /// Print the URL that starts an external-identity login
    #[command(name = "oauth-url")]
    OAuthUrl {
        /// Identity provider, e.g. google
        provider: String,

        /// Role hint passed to the provider
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },

    /// Complete an external-identity login from its redirect URL
    #[command(name = "oauth-complete")]
    OAuthComplete {
        /// Redirect URL carrying `token=`
        url: String,
    },

    /// Email a one-time login code
    #[command(name = "request-code")]
    RequestCode {
        /// Account email
        #[arg(long)]
        email: String,
    },

    /// Log in with a one-time code
    #[command(name = "verify-code")]
    VerifyCode {
        /// Account email
        #[arg(long)]
        email: String,

        /// Code from the email
        #[arg(long)]
        code: String,
    },
}

/// Arguments for `login`.
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long, env = "IPGATE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Location to resume after login
    #[arg(long)]
    pub redirect: Option<String>,
}

/// Arguments for `register`.
#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Given name
    #[arg(long)]
    pub first_name: String,

    /// Family name
    #[arg(long)]
    pub last_name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long, env = "IPGATE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Password again; defaults to `--password`
    #[arg(long)]
    pub confirm_password: Option<String>,

    /// USER, ANALYST or ADMIN
    #[arg(long, default_value = "USER")]
    pub role: String,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse().map_err(|e: ipgate_auth::role::UnknownRole| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from([
            "ipgate",
            "--api-url",
            "http://api.test/api",
            "login",
            "--email",
            "admin@test.com",
            "--password",
            "admin",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://api.test/api"));
        match cli.command {
            Commands::Login(args) => {
                assert_eq!(args.email, "admin@test.com");
                assert!(args.redirect.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_oauth_url_role() {
        let cli = Cli::try_parse_from(["ipgate", "oauth-url", "google", "--role", "analyst"]).unwrap();
        match cli.command {
            Commands::OAuthUrl { provider, role } => {
                assert_eq!(provider, "google");
                assert_eq!(role, Some(Role::Analyst));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["ipgate", "oauth-url", "google", "--role", "root"]).is_err());
    }

    #[test]
    fn test_check_requires_path() {
        assert!(Cli::try_parse_from(["ipgate", "check"]).is_err());
    }
}
