//! Integration tests for the CSRF token round trip
//!
//! Uses `axum_test::TestServer` with a cookie jar so the session survives
//! between requests.

use std::sync::Arc;

use axum_test::TestServer;
use formmail::handlers::TokenResponse;
use formmail::server::router;
use formmail::state::AppState;
use formmail::testing::{test_config, MockEmailSender};
use http::StatusCode;

fn server(sender: &MockEmailSender, require_token: bool) -> TestServer {
    let mut config = test_config();
    config.security.require_token = require_token;
    let app = router(AppState::with_sender(config, Arc::new(sender.clone())));

    let mut server = TestServer::new(app).unwrap();
    server.save_cookies();
    server
}

fn form(token: &str) -> Vec<(&'static str, String)> {
    vec![
        ("email", "visitor@example.org".to_string()),
        ("name", "Visitor".to_string()),
        ("message", "Hello".to_string()),
        ("token", token.to_string()),
    ]
}

#[tokio::test]
async fn test_token_is_stable_within_session() {
    let sender = MockEmailSender::new();
    let server = server(&sender, false);

    let first: TokenResponse = server.get("/token").await.json();
    let second: TokenResponse = server.get("/token").await.json();

    assert_eq!(first.token.len(), 512);
    assert!(first.token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(first.token, second.token);
}

#[tokio::test]
async fn test_sessions_get_distinct_tokens() {
    let sender = MockEmailSender::new();
    let one = server(&sender, false);
    let two = server(&sender, false);

    let a: TokenResponse = one.get("/token").await.json();
    let b: TokenResponse = two.get("/token").await.json();

    assert_ne!(a.token, b.token);
}

#[tokio::test]
async fn test_matching_token_sends() {
    let sender = MockEmailSender::new();
    let server = server(&sender, true);

    let issued: TokenResponse = server.get("/token").await.json();
    let response = server.post("/send").form(&form(&issued.token)).await;

    response.assert_status_ok();
    assert_eq!(response.text(), "Message sent");
    assert_eq!(sender.sent_count(), 1);
}

#[tokio::test]
async fn test_token_from_other_session_is_rejected() {
    let sender = MockEmailSender::new();
    let victim = server(&sender, false);
    let attacker = server(&sender, false);

    let stolen: TokenResponse = victim.get("/token").await.json();
    let _own: TokenResponse = attacker.get("/token").await.json();

    let response = attacker.post("/send").form(&form(&stolen.token)).await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.text(), "Invalid token");
    assert_eq!(sender.sent_count(), 0);
}

#[tokio::test]
async fn test_token_without_issued_token_is_rejected() {
    let sender = MockEmailSender::new();
    let server = server(&sender, false);

    let response = server.post("/send").form(&form("abc")).await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(sender.sent_count(), 0);
}

#[tokio::test]
async fn test_empty_token_skips_check_when_optional() {
    let sender = MockEmailSender::new();
    let server = server(&sender, false);

    let response = server.post("/send").form(&form("")).await;

    response.assert_status_ok();
    assert_eq!(sender.sent_count(), 1);
}

#[tokio::test]
async fn test_health() {
    let sender = MockEmailSender::new();
    let server = server(&sender, false);

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}
