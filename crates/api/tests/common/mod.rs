#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use jobbit_api::auth::jwt::JwtConfig;
use jobbit_api::auth::otp::OtpConfig;
use jobbit_api::auth::password::hash_password;
use jobbit_api::config::{FrontendConfig, ServerConfig};
use jobbit_api::oauth::OAuthConfigs;
use jobbit_api::router::build_app_router;
use jobbit_api::state::AppState;
use jobbit_api::storage::StorageConfig;
use jobbit_db::models::user::{CreateUser, User};
use jobbit_db::repositories::UserRepo;

pub const TEST_PASSWORD: &str = "Str0ng-Passw0rd!";

/// Build a test `ServerConfig` with safe defaults.
///
/// No outbound service is configured: email and SMS are logged, no acquirer
/// or OAuth provider is registered, and uploads go to a temporary directory.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        http_client_timeout_secs: 5,
        file_head_timeout_secs: 1,
        send_delete_confirmation: true,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 1,
        },
        otp: OtpConfig {
            expiry_mins: 5,
            code_length: 6,
            max_attempts: 3,
        },
        frontend: FrontendConfig {
            protocol: "http".to_string(),
            url: "localhost:3000".to_string(),
        },
        email: None,
        sms: None,
        oauth: OAuthConfigs::default(),
        cryptocloud: None,
        stripe: None,
        storage: StorageConfig::Local {
            root: media_root(),
            public_url: "/media".to_string(),
        },
    }
}

fn media_root() -> PathBuf {
    std::env::temp_dir().join("jobbit-api-tests-media")
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::from_config(pool, test_config())
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with_state(test_state(pool))
}

/// Same as [`build_test_app`] for a state the test has customised.
pub fn build_app_with_state(state: AppState) -> Router {
    let config = state.config.as_ref().clone();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str) -> User {
    let input = CreateUser {
        email: Some(email.to_string()),
        phone_number: None,
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        is_active: true,
        type_2fa: "EMAIL".to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

pub async fn create_superuser(pool: &PgPool, email: &str) -> User {
    let hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::upsert_superuser(pool, email, &hash)
        .await
        .expect("superuser creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login(app: &Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/v1/token/generate", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let json = body_json(response).await;
    json["access"]
        .as_str()
        .expect("login response must contain access")
        .to_string()
}

/// Create a user and return their access token.
pub async fn user_with_token(pool: &PgPool, app: &Router, email: &str) -> (User, String) {
    let user = create_user(pool, email).await;
    let token = login(app, email).await;
    (user, token)
}

/// Latest OTP code issued, read straight from storage.
pub async fn latest_otp_code(pool: &PgPool) -> String {
    let (code,): (String,) =
        sqlx::query_as("SELECT code FROM otp_challenges ORDER BY created_at DESC LIMIT 1")
            .fetch_one(pool)
            .await
            .expect("an OTP should have been issued");
    code
}

/// Create a profile of `role` (`client` or `executor`) for the token holder.
pub async fn create_profile(app: &Router, token: &str, role: &str) -> serde_json::Value {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/{role}/profile"),
        serde_json::json!({ "name": "Alex", "username": format!("{role}_alex") }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "{role} profile should be created");
    body_json(response).await
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

fn json_request(
    method: &str,
    uri: &str,
    body: &serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("POST", uri, &body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("POST", uri, &body, Some(token))).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("PATCH", uri, &body, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
