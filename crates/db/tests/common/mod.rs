//! Seeding helpers shared by the store integration tests.
//!
//! Users, providers and taxonomy rows are owned by other services, so tests
//! insert them with raw SQL.

#![allow(dead_code)]

use huduma_db::models::request::{CreateRequest, CreatedRequest};
use huduma_db::repositories::RequestRepo;
use sqlx::PgPool;
use uuid::Uuid;

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

pub async fn seed_industry(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO industries (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Create a user and register them as a provider.
pub async fn seed_provider(
    pool: &PgPool,
    user_id: &str,
    first: &str,
    last: &str,
    category_id: Option<i64>,
    industry_id: Option<i64>,
) -> Uuid {
    seed_user(pool, user_id, first, last).await;
    let provider_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO providers (provider_id, user_id, category_id, industry_id) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(provider_id)
    .bind(user_id)
    .bind(category_id)
    .bind(industry_id)
    .execute(pool)
    .await
    .unwrap();
    provider_id
}

pub fn new_request(client_id: &str, title: &str) -> CreateRequest {
    CreateRequest {
        booking_id: Uuid::new_v4(),
        client_id: client_id.to_string(),
        category_id: None,
        location_id: None,
        title: title.to_string(),
        note: None,
        is_urgent: false,
        start_at: None,
        photos: Vec::new(),
    }
}

pub async fn create_request(pool: &PgPool, client_id: &str, title: &str) -> CreatedRequest {
    RequestRepo::create(pool, &new_request(client_id, title))
        .await
        .unwrap()
}

pub async fn status_of(pool: &PgPool, booking_id: Uuid) -> String {
    sqlx::query_scalar("SELECT status FROM bookings WHERE booking_id = $1")
        .bind(booking_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
