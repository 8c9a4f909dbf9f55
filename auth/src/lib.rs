//! # ipgate Auth
//!
//! Client-side session and authorization core for the IP intelligence
//! platform: credential acquisition, session persistence and restoration,
//! the role hierarchy, per-navigation access decisions, and completion of
//! external-identity (OAuth2) logins.
//!
//! ## Components
//!
//! - [`SessionStore`]: sole owner of the live session and its persisted copy
//! - [`AuthGateway`]: backend calls (`HttpAuthGateway` in production)
//! - [`RoleResolver`]: the fixed `ADMIN ⊇ ANALYST ⊇ USER` hierarchy
//! - [`AccessGuard`]: per-navigation decisions, driven by [`GuardReducer`]
//! - [`OAuthCompletionHandler`]: external-identity redirect completion
//! - [`AuthService`]: the facade a host application calls
//!
//! ## Architecture
//!
//! ```text
//! AuthService ──▶ AuthGateway ──▶ backend
//!      │
//!      └──▶ SessionStore ──▶ SessionStorage (file / memory)
//!                 ▲
//! AccessGuard ────┘  (GuardReducer: Navigate → Checking → decision)
//! ```
//!
//! ## Example: Login and Guard
//!
//! ```
//! # tokio_test::block_on(async {
//! use ipgate_auth::mocks::{MemoryStorage, MockAuthGateway};
//! use ipgate_auth::*;
//! use std::sync::Arc;
//!
//! let admin = Session::bearer(
//!     Credential::new("token").unwrap(),
//!     User::new("Admin", "admin@test.com", Role::Admin),
//! );
//! let gateway = Arc::new(MockAuthGateway::new().with_login(Ok(admin)));
//! let store = Arc::new(SessionStore::new(MemoryStorage::new()));
//! store.init().await;
//!
//! let service = AuthService::new(gateway, store, ClientConfig::default());
//! let outcome = service
//!     .login(&LoginForm::new("admin@test.com", "admin"), None)
//!     .await
//!     .unwrap();
//! assert_eq!(outcome.landing, "/admin-dashboard");
//!
//! let decision = service.guard().resolve("/analyst-dashboard", Some(Role::Analyst)).await;
//! assert!(decision.is_allowed());
//! # });
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

// Public modules
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod oauth;
pub mod role;
pub mod routes;
pub mod service;
pub mod session_store;
pub mod state;
pub mod storage;
pub mod validation;

// Mock implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::{AuthError, AuthErrorKind, Result};
pub use gateway::{AuthGateway, HttpAuthGateway, RegistrationConfirmation};
pub use guard::{AccessDecision, AccessGuard, Denial, GuardAction, GuardPhase, GuardReducer, GuardState};
pub use oauth::{OAuthCompletionHandler, OAuthOutcome};
pub use role::{Role, RoleResolver};
pub use routes::{Requirement, RouteTable};
pub use service::{AuthService, LoginOutcome};
pub use session_store::{SessionStore, SubscriptionId};
pub use state::{Credential, Session, User, UserId};
pub use validation::{LoginForm, RegistrationForm};
