//! Test utilities and common setup.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use devreg::api;
use devreg::auth::{AuthConfig, AuthState, UserEntry};
use devreg::db::Database;
use devreg::device::{DeviceRepository, DeviceService};

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

pub const ALICE: (&str, &str) = ("alice", "alice-password");
pub const BOB: (&str, &str) = ("bob", "bob-password");

/// Create a test AuthConfig with two users hashed at minimum cost.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        token_secret: Some(TEST_SECRET.to_string()),
        token_ttl_secs: 3600,
        users: vec![
            UserEntry::with_password(ALICE.0, ALICE.1, 4).unwrap(),
            UserEntry::with_password(BOB.0, BOB.1, 4).unwrap(),
        ],
    }
}

/// Create a test application backed by an in-memory database.
pub async fn test_app() -> Router {
    let db = Database::in_memory().await.unwrap();

    let auth_state = AuthState::from_config(&test_auth_config()).unwrap();
    let devices = DeviceService::new(DeviceRepository::new(db.pool().clone()));

    let state = api::AppState::new(devices, auth_state);
    api::create_router(state)
}

/// `Authorization` value for HTTP Basic.
pub fn basic((username, password): (&str, &str)) -> String {
    format!(
        "Basic {}",
        BASE64.encode(format!("{username}:{password}"))
    )
}

/// `Authorization` value for a bearer token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Build a request with optional credentials and JSON body.
pub fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }

    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
