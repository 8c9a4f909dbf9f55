//! `HttpAuthGateway` against a mock backend.

#![allow(clippy::unwrap_used)]

use ipgate_auth::validation::RegistrationForm;
use ipgate_auth::{AuthErrorKind, AuthGateway, ClientConfig, Credential, HttpAuthGateway, Role};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, HttpAuthGateway) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(format!("{}/api", server.uri()))
        .with_request_timeout(Duration::from_secs(2));
    (server, HttpAuthGateway::new(config).unwrap())
}

fn admin_json() -> serde_json::Value {
    json!({"id": 1, "username": "Admin", "email": "admin@test.com", "role": "ADMIN"})
}

#[tokio::test]
async fn test_login_success_normalizes_email() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "admin@test.com", "password": "admin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "jwt-admin",
            "tokenType": "Bearer",
            "user": admin_json(),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = gateway.login(" ADMIN@test.com ", "admin").await.unwrap();

    assert_eq!(session.credential().expose(), "jwt-admin");
    assert_eq!(session.role(), Role::Admin);
    assert_eq!(session.authorization_header(), "Bearer jwt-admin");
}

#[tokio::test]
async fn test_login_missing_token_type_defaults_to_bearer() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "t", "user": admin_json()})),
        )
        .mount(&server)
        .await;

    let session = gateway.login("admin@test.com", "admin").await.unwrap();
    assert_eq!(session.scheme(), "Bearer");
}

#[tokio::test]
async fn test_login_incomplete_body_is_server_fault() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": admin_json()})))
        .mount(&server)
        .await;

    let err = gateway.login("admin@test.com", "admin").await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::ServerFault);
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (401_u16, json!({"error": "Bad credentials"}), AuthErrorKind::InvalidCredentials, "Invalid email or password. Please try again."),
        (400, json!({"error": "Email is not verified"}), AuthErrorKind::ValidationFailure, "Email is not verified"),
        (403, json!({"message": "Account locked"}), AuthErrorKind::ValidationFailure, "Account locked"),
        (500, json!({}), AuthErrorKind::ServerFault, "Server error: 500"),
    ];

    for (status, body, kind, message) in cases {
        let (server, gateway) = setup().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        let err = gateway.login("user@test.com", "user").await.unwrap_err();
        assert_eq!(err.kind(), kind, "status {status}");
        assert_eq!(err.message(), message, "status {status}");
    }
}

#[tokio::test]
async fn test_unreachable_backend() {
    let config = ClientConfig::new("http://127.0.0.1:1/api")
        .with_request_timeout(Duration::from_secs(2));
    let gateway = HttpAuthGateway::new(config).unwrap();

    let err = gateway.login("user@test.com", "user").await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::NetworkUnreachable);
}

#[tokio::test]
async fn test_register_sends_canonical_payload() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "username": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "engine",
            "role": "ANALYST",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("User registered"))
        .expect(1)
        .mount(&server)
        .await;

    let request = RegistrationForm {
        first_name: "Ada".to_string(),
        last_name: " Lovelace".to_string(),
        email: "ADA@example.com".to_string(),
        password: "engine".to_string(),
        confirm_password: "engine".to_string(),
        role: "Analyst".to_string(),
    }
    .validate()
    .unwrap();

    let confirmation = gateway.register(&request).await.unwrap();
    assert_eq!(confirmation.message, "Registration successful! Please login.");
}

#[tokio::test]
async fn test_register_conflict_carries_server_message() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Email already registered"))
        .mount(&server)
        .await;

    let request = RegistrationForm {
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email: "a@b.co".to_string(),
        password: "pass".to_string(),
        confirm_password: "pass".to_string(),
        role: "USER".to_string(),
    }
    .validate()
    .unwrap();

    let err = gateway.register(&request).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::ValidationFailure);
    assert_eq!(err.message(), "Email already registered");
}

#[tokio::test]
async fn test_fetch_profile_sends_authorization() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer jwt-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(admin_json()))
        .expect(1)
        .mount(&server)
        .await;

    let credential = Credential::new("jwt-admin").unwrap();
    let user = gateway.fetch_profile(&credential, "Bearer").await.unwrap();
    assert_eq!(user.email, "admin@test.com");
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_fetch_profile_failures() {
    let credential = Credential::new("jwt").unwrap();

    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let err = gateway.fetch_profile(&credential, "Bearer").await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::InvalidCredentials);

    for response in [
        ResponseTemplate::new(500),
        ResponseTemplate::new(404),
        ResponseTemplate::new(200).set_body_json(json!({"username": "x"})),
    ] {
        let (server, gateway) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(response)
            .mount(&server)
            .await;

        let err = gateway.fetch_profile(&credential, "Bearer").await.unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::ProfileFetchFailure);
    }
}

#[tokio::test]
async fn test_one_time_code_endpoints() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/request-login"))
        .and(query_param("email", "analyst@test.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OTP sent to email: analyst@test.com"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-login"))
        .and(query_param("email", "analyst@test.com"))
        .and(query_param("code", "123456"))
        .respond_with(ResponseTemplate::new(200).set_body_string("eyJhbGciOiJIUzI1NiJ9.e30.sig"))
        .expect(1)
        .mount(&server)
        .await;

    gateway.request_login_code("Analyst@Test.com").await.unwrap();
    let credential = gateway
        .verify_login_code("analyst@test.com", " 123456 ")
        .await
        .unwrap();

    assert_eq!(credential.expose(), "eyJhbGciOiJIUzI1NiJ9.e30.sig");
}

#[tokio::test]
async fn test_wrong_code_is_rejected() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid or expired code"))
        .mount(&server)
        .await;

    let err = gateway
        .verify_login_code("analyst@test.com", "000000")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::ValidationFailure);
    assert_eq!(err.message(), "Invalid or expired code");
}
