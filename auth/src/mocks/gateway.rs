//! Mock gateway for testing.

use crate::error::{AuthError, Result};
use crate::gateway::{AuthGateway, RegistrationConfirmation};
use crate::state::{Credential, Session, User};
use crate::validation::{RegisterRequest, normalize_email};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug)]
struct Script {
    login: Result<Session>,
    register: Result<RegistrationConfirmation>,
    profile: Result<User>,
    request_code: Result<()>,
    verify_code: Result<Credential>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            login: Err(AuthError::invalid_credentials()),
            register: Ok(RegistrationConfirmation::default()),
            profile: Err(AuthError::invalid_credentials()),
            request_code: Ok(()),
            verify_code: Err(AuthError::invalid_credentials()),
        }
    }
}

#[derive(Debug, Default)]
struct Calls {
    login: AtomicUsize,
    register: AtomicUsize,
    fetch_profile: AtomicUsize,
    request_code: AtomicUsize,
    verify_code: AtomicUsize,
}

#[derive(Debug, Default)]
struct Recorded {
    login_email: Option<String>,
    register: Option<RegisterRequest>,
    profile_credential: Option<Credential>,
}

/// Mock gateway.
///
/// Each method returns its scripted result on every call. Unscripted logins,
/// profile lookups and code verifications fail with `InvalidCredentials`;
/// registration and code requests succeed. Clones share script and counters.
#[derive(Debug, Clone, Default)]
pub struct MockAuthGateway {
    script: Arc<Mutex<Script>>,
    calls: Arc<Calls>,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockAuthGateway {
    /// Create a mock with the default script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `login`.
    #[must_use]
    pub fn with_login(self, result: Result<Session>) -> Self {
        self.script().login = result;
        self
    }

    /// Script `register`.
    #[must_use]
    pub fn with_register(self, result: Result<RegistrationConfirmation>) -> Self {
        self.script().register = result;
        self
    }

    /// Script `fetch_profile`.
    #[must_use]
    pub fn with_profile(self, result: Result<User>) -> Self {
        self.script().profile = result;
        self
    }

    /// Script `request_login_code`.
    #[must_use]
    pub fn with_request_code(self, result: Result<()>) -> Self {
        self.script().request_code = result;
        self
    }

    /// Script `verify_login_code`.
    #[must_use]
    pub fn with_verify_code(self, result: Result<Credential>) -> Self {
        self.script().verify_code = result;
        self
    }

    /// Replace the `fetch_profile` result on a shared mock.
    pub fn set_profile(&self, result: Result<User>) {
        self.script().profile = result;
    }

    /// Number of `login` calls.
    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.calls.login.load(Ordering::SeqCst)
    }

    /// Number of `register` calls.
    #[must_use]
    pub fn register_calls(&self) -> usize {
        self.calls.register.load(Ordering::SeqCst)
    }

    /// Number of `fetch_profile` calls.
    #[must_use]
    pub fn fetch_profile_calls(&self) -> usize {
        self.calls.fetch_profile.load(Ordering::SeqCst)
    }

    /// Number of `request_login_code` calls.
    #[must_use]
    pub fn request_code_calls(&self) -> usize {
        self.calls.request_code.load(Ordering::SeqCst)
    }

    /// Number of `verify_login_code` calls.
    #[must_use]
    pub fn verify_code_calls(&self) -> usize {
        self.calls.verify_code.load(Ordering::SeqCst)
    }

    /// Email sent by the last `login`, after normalization.
    #[must_use]
    pub fn last_login_email(&self) -> Option<String> {
        self.recorded().login_email.clone()
    }

    /// Payload of the last `register`.
    #[must_use]
    pub fn last_register(&self) -> Option<RegisterRequest> {
        self.recorded().register.clone()
    }

    /// Credential passed to the last `fetch_profile`.
    #[must_use]
    pub fn last_profile_credential(&self) -> Option<Credential> {
        self.recorded().profile_credential.clone()
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthGateway for MockAuthGateway {
    fn login(&self, email: &str, _password: &str) -> impl Future<Output = Result<Session>> + Send {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.recorded().login_email = Some(normalize_email(email));
        let result = self.script().login.clone();
        async move { result }
    }

    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<RegistrationConfirmation>> + Send {
        self.calls.register.fetch_add(1, Ordering::SeqCst);
        self.recorded().register = Some(request.clone());
        let result = self.script().register.clone();
        async move { result }
    }

    fn fetch_profile(
        &self,
        credential: &Credential,
        _scheme: &str,
    ) -> impl Future<Output = Result<User>> + Send {
        self.calls.fetch_profile.fetch_add(1, Ordering::SeqCst);
        self.recorded().profile_credential = Some(credential.clone());
        let result = self.script().profile.clone();
        async move { result }
    }

    fn request_login_code(&self, _email: &str) -> impl Future<Output = Result<()>> + Send {
        self.calls.request_code.fetch_add(1, Ordering::SeqCst);
        let result = self.script().request_code.clone();
        async move { result }
    }

    fn verify_login_code(
        &self,
        _email: &str,
        _code: &str,
    ) -> impl Future<Output = Result<Credential>> + Send {
        self.calls.verify_code.fetch_add(1, Ordering::SeqCst);
        let result = self.script().verify_code.clone();
        async move { result }
    }
}
