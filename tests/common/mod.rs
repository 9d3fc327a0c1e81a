// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use fitlog::config::Config;
use fitlog::db::{DocumentStore, FirestoreDb, MemoryStore};
use fitlog::identity::{IdentityProvider, MemoryIdentity};
use fitlog::middleware::auth::create_jwt;
use fitlog::models::{new_id, Session, User};
use fitlog::routes::create_router;
use fitlog::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Router plus handles on the memory backends behind it.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: MemoryStore,
    pub identity: MemoryIdentity,
}

/// Create a test app on memory backends with the default test config.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let store = MemoryStore::new();
    let identity = MemoryIdentity::new(false);
    let state = Arc::new(AppState::new(
        config,
        Arc::new(store.clone()),
        Arc::new(identity.clone()),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        identity,
    }
}

/// A session for a user that only exists in tokens (no identity behind it).
#[allow(dead_code)]
pub fn test_session() -> Session {
    let user_id = new_id();
    Session {
        email: format!("{}@example.com", &user_id[..8]),
        user_id,
    }
}

#[allow(dead_code)]
pub fn create_test_jwt(session: &Session, signing_key: &[u8]) -> String {
    create_jwt(session, signing_key).unwrap()
}

/// Register a verified identity with a user document and return its session.
#[allow(dead_code)]
pub async fn verified_user(app: &TestApp, email: &str, password: &str) -> Session {
    let identity = app.identity.sign_up(email, password).await.unwrap();
    app.identity.verify_email(email);
    let now = fitlog::time_utils::now_rfc3339();
    app.state
        .store
        .upsert_user(&User {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            created_at: now.clone(),
            last_active: now,
        })
        .await
        .unwrap();

    Session {
        user_id: identity.user_id,
        email: identity.email,
    }
}

/// A token-only session whose user document exists, so the auth
/// middleware accepts it.
#[allow(dead_code)]
pub async fn signed_in_session(app: &TestApp) -> Session {
    let session = test_session();
    let now = fitlog::time_utils::now_rfc3339();
    app.state
        .store
        .upsert_user(&User {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            first_name: String::new(),
            last_name: String::new(),
            created_at: now.clone(),
            last_active: now,
        })
        .await
        .unwrap();
    session
}

/// Send one request and return the status with the parsed JSON body
/// (`Value::Null` for an empty body).
#[allow(dead_code)]
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Send a raw body with a JSON content type and return the status with the
/// parsed JSON reply.
#[allow(dead_code)]
pub async fn send_raw(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: &str,
    body: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
