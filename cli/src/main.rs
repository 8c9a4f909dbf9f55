//! `ipgate` command-line client.
//!
//! Drives the session core against a live backend, persisting the session
//! in a directory so successive invocations share it.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Commands, LoginArgs, RegisterArgs};
use ipgate_auth::oauth::authorization_url;
use ipgate_auth::storage::FileStorage;
use ipgate_auth::{
    AccessDecision, AuthService, ClientConfig, HttpAuthGateway, LoginForm, OAuthOutcome,
    RegistrationForm, Session, SessionStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Service = AuthService<HttpAuthGateway, FileStorage>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipgate=info,ipgate_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli);

    let service = connect(config).await?;
    run(&service, cli.command).await
}

async fn run(service: &Service, command: Commands) -> Result<()> {
    match command {
        Commands::Login(args) => login(service, args).await,
        Commands::Register(args) => register(service, args).await,
        Commands::Logout => {
            service.logout().await;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami { revalidate } => whoami(service, revalidate).await,
        Commands::Check { path } => check(service, &path).await,
        Commands::OAuthComplete { url } => {
            let outcome = service.complete_oauth(&url).await;
            for line in oauth_report(&outcome) {
                println!("{line}");
            }
            outcome.result.map(drop).map_err(Into::into)
        }
        Commands::RequestCode { email } => {
            service.request_login_code(&email).await?;
            println!("Login code sent to {email}");
            Ok(())
        }
        Commands::VerifyCode { email, code } => {
            let outcome = service.login_with_code(&email, &code, None).await?;
            print_session(&outcome.session);
            println!("Next: {}", outcome.landing);
            Ok(())
        }
        Commands::OAuthUrl { provider, role } => {
            println!("{}", authorization_url(service.config(), &provider, role));
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.api_url {
        config.api_base_url.clone_from(url);
    }
    if let Some(url) = &cli.oauth_url {
        config.oauth_base_url.clone_from(url);
    }
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = Some(dir.clone());
    }
    config
}

fn default_storage_dir() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(".ipgate"),
        |home| PathBuf::from(home).join(".ipgate"),
    )
}

async fn connect(config: ClientConfig) -> Result<Service> {
    let dir = config.storage_dir.clone().unwrap_or_else(default_storage_dir);
    tracing::debug!(dir = %dir.display(), api = %config.api_base_url, "Using session storage");

    let gateway = HttpAuthGateway::new(config.clone()).context("failed to set up HTTP client")?;
    let store = Arc::new(SessionStore::new(FileStorage::new(dir)));
    store.init().await;

    Ok(AuthService::new(Arc::new(gateway), store, config))
}

async fn login(service: &Service, args: LoginArgs) -> Result<()> {
    let form = LoginForm::new(args.email, args.password);
    let outcome = service.login(&form, args.redirect.as_deref()).await?;
    print_session(&outcome.session);
    println!("Next: {}", outcome.landing);
    Ok(())
}

async fn register(service: &Service, args: RegisterArgs) -> Result<()> {
    let form = RegistrationForm {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        confirm_password: args.confirm_password.unwrap_or_else(|| args.password.clone()),
        password: args.password,
        role: args.role,
    };
    let confirmation = service.register(&form).await?;
    println!("{}", confirmation.message);
    Ok(())
}

async fn whoami(service: &Service, revalidate: bool) -> Result<()> {
    let session = if revalidate {
        service.revalidate().await?
    } else {
        service.store().current()
    };

    match session {
        Some(session) => print_session(&session),
        None => println!("Not logged in"),
    }
    Ok(())
}

async fn check(service: &Service, path: &str) -> Result<()> {
    match service.navigate(path).await {
        None => bail!("no route for {path}"),
        Some(AccessDecision::Allowed) => println!("allowed"),
        Some(AccessDecision::Redirect { location, denial }) => {
            println!("denied ({denial:?}), redirect to {location}");
        }
        Some(AccessDecision::Checking) => println!("checking"),
    }
    Ok(())
}

fn print_session(session: &Session) {
    println!("{}", session_line(session));
}

fn session_line(session: &Session) -> String {
    let user = session.user();
    format!("{} <{}> [{}]", user.username, user.email, user.role)
}

/// Lines shown after an external-identity completion, failed or not.
fn oauth_report(outcome: &OAuthOutcome) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if let Ok(session) = &outcome.result {
        lines.push(session_line(session));
    }
    lines.push(format!("Next: {}", outcome.redirect));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipgate_auth::{AuthError, Credential, Role, User};

    #[test]
    fn test_oauth_report_shows_login_redirect_on_failure() {
        let outcome = OAuthOutcome {
            redirect: "/login".to_string(),
            result: Err(AuthError::missing_token()),
        };
        assert_eq!(oauth_report(&outcome), vec!["Next: /login".to_string()]);
    }

    #[test]
    fn test_oauth_report_shows_session_and_dashboard() {
        let session = Session::bearer(
            Credential::new("t").unwrap(),
            User::new("Analyst", "analyst@test.com", Role::Analyst),
        );
        let outcome = OAuthOutcome {
            redirect: "/analyst-dashboard".to_string(),
            result: Ok(session),
        };
        assert_eq!(
            oauth_report(&outcome),
            vec![
                "Analyst <analyst@test.com> [ANALYST]".to_string(),
                "Next: /analyst-dashboard".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_oauth_url_runs_through_dispatch() {
        let config = ClientConfig::new("http://127.0.0.1:1/api")
            .with_storage_dir(std::env::temp_dir().join("ipgate-cli-oauth-url-test"));
        let service = connect(config).await.unwrap();

        let command = Commands::OAuthUrl {
            provider: "google".to_string(),
            role: Some(Role::Admin),
        };
        assert!(run(&service, command).await.is_ok());
    }
}
