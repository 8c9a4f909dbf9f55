//! HTTP implementation of [`AuthGateway`](super::AuthGateway).

use super::{AuthGateway, LoginResponse, RegistrationConfirmation, server_message};
use crate::config::ClientConfig;
use crate::error::{AuthError, Result};
use crate::state::{Credential, Session, User};
use crate::validation::{RegisterRequest, normalize_email};
use reqwest::{Client, Response, StatusCode, header};
use serde::Serialize;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Gateway backed by the platform's REST API.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: Client,
    config: ClientConfig,
}

impl HttpAuthGateway {
    /// Create a gateway with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `ServerFault` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::server_fault(format!("HTTP client setup failed: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Create a gateway over an existing client.
    #[must_use]
    pub const fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Gateway configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        self.config.endpoint_url(endpoint)
    }

    fn transport_error(e: &reqwest::Error) -> AuthError {
        tracing::warn!(error = %e, "Auth backend unreachable");
        AuthError::network_unreachable()
    }

    /// Pass successful responses through; map everything else.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(status.as_u16(), &body);

        match status {
            StatusCode::UNAUTHORIZED => Err(AuthError::invalid_credentials()),
            status if status.is_client_error() => {
                tracing::debug!(status = status.as_u16(), %message, "Request rejected");
                Err(AuthError::validation(message))
            }
            status => {
                tracing::error!(status = status.as_u16(), %message, "Auth backend error");
                Err(AuthError::server_fault(message))
            }
        }
    }

    /// Read a plain-text token body, tolerating a JSON-quoted string.
    fn parse_token(body: &str) -> Option<Credential> {
        let body = body.trim();
        let raw = serde_json::from_str::<String>(body).unwrap_or_else(|_| body.to_string());
        Credential::new(raw.trim())
    }
}

impl AuthGateway for HttpAuthGateway {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);
        tracing::debug!(%email, "POST login");

        let response = self
            .client
            .post(self.url(&self.config.endpoints.login))
            .json(&LoginRequest {
                email: &email,
                password,
            })
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let body: LoginResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AuthError::server_fault(format!("Malformed login response: {e}")))?;

        let credential = body
            .access_token
            .and_then(Credential::new)
            .ok_or_else(|| AuthError::server_fault("Login response has no access token"))?;
        let user = body
            .user
            .filter(User::is_well_formed)
            .ok_or_else(|| AuthError::server_fault("Login response has no user"))?;

        Ok(Session::new(
            credential,
            body.token_type.unwrap_or_default(),
            user,
        ))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegistrationConfirmation> {
        tracing::debug!(email = %request.email, role = %request.role, "POST register");

        let response = self
            .client
            .post(self.url(&self.config.endpoints.register))
            .json(request)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        Self::check(response).await?;
        Ok(RegistrationConfirmation::default())
    }

    async fn fetch_profile(&self, credential: &Credential, scheme: &str) -> Result<User> {
        tracing::debug!("GET profile");

        let response = self
            .client
            .get(self.url(&self.config.endpoints.profile))
            .header(
                header::AUTHORIZATION,
                format!("{scheme} {}", credential.expose()),
            )
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AuthError::invalid_credentials()),
            status if status.is_success() => response
                .json::<User>()
                .await
                .ok()
                .filter(User::is_well_formed)
                .ok_or_else(|| {
                    tracing::warn!("Profile response is not a valid user");
                    AuthError::profile_fetch_failure()
                }),
            status => {
                tracing::warn!(status = status.as_u16(), "Profile lookup failed");
                Err(AuthError::profile_fetch_failure())
            }
        }
    }

    async fn request_login_code(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        tracing::debug!(%email, "POST request-login");

        let response = self
            .client
            .post(self.url(&self.config.endpoints.request_login_code))
            .query(&[("email", email.as_str())])
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        Self::check(response).await.map(|_| ())
    }

    async fn verify_login_code(&self, email: &str, code: &str) -> Result<Credential> {
        let email = normalize_email(email);
        tracing::debug!(%email, "POST verify-login");

        let response = self
            .client
            .post(self.url(&self.config.endpoints.verify_login_code))
            .query(&[("email", email.as_str()), ("code", code.trim())])
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let body = Self::check(response)
            .await?
            .text()
            .await
            .map_err(|e| AuthError::server_fault(format!("Malformed login response: {e}")))?;

        Self::parse_token(&body)
            .ok_or_else(|| AuthError::server_fault("Login response has no access token"))
    }
}
