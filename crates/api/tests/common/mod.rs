//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use huduma_api::auth::jwt::{generate_access_token, JwtConfig};
use huduma_api::config::{LogFormat, ServerConfig};
use huduma_api::router::build_app_router;
use huduma_api::state::AppState;
use huduma_lifecycle::{LifecycleConfig, LifecycleService};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-not-for-production";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".parse().unwrap()],
        request_timeout_secs: 30,
        database_url: String::new(),
        database_max_connections: 5,
        log_format: LogFormat::Pretty,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
        lifecycle: LifecycleConfig::default(),
    }
}

/// Build the full application router on top of `pool`, with the same
/// middleware stack `main.rs` uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        lifecycle: LifecycleService::new(pool.clone(), config.lifecycle),
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A valid access token for `user_id`.
pub fn token_for(user_id: &str) -> String {
    generate_access_token(user_id, 3600, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("Authorization", format!("Bearer {}", token_for(user)));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// POST a raw body with a JSON content type, valid or not.
pub async fn post_raw_as(app: Router, user: &str, uri: &str, body: &'static str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token_for(user)))
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: Router, user: &str, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(user), None).await
}

pub async fn post_json_as(app: Router, user: &str, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(user), Some(body)).await
}

pub async fn post_as(app: Router, user: &str, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(user), None).await
}

pub async fn put_as(app: Router, user: &str, uri: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(user), None).await
}

pub async fn delete_as(app: Router, user: &str, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(user), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status, then return the `data` envelope.
pub async fn expect_data(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let mut json = body_json(response).await;
    json["data"].take()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_user(pool: &PgPool, user_id: &str, first: &str, last: &str) {
    sqlx::query("INSERT INTO users (user_id, first_name, last_name) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(first)
        .bind(last)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn seed_category(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_provider(pool: &PgPool, user_id: &str, first: &str, category_id: Option<i64>) -> Uuid {
    seed_user(pool, user_id, first, "Provider").await;
    let provider_id = Uuid::new_v4();
    sqlx::query("INSERT INTO providers (provider_id, user_id, category_id) VALUES ($1, $2, $3)")
        .bind(provider_id)
        .bind(user_id)
        .bind(category_id)
        .execute(pool)
        .await
        .unwrap();
    provider_id
}
