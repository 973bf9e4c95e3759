//! Common test utilities

use axum::{middleware, routing::post, Router};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to the test database, or None when DATABASE_URL is unset
/// (DB-backed tests skip themselves in that case).
pub async fn try_connect_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    Some(pool)
}

/// Build the application router the way main.rs does: public registration
/// plus the authenticated API under /api/v1.
#[allow(dead_code)]
pub fn test_app(pool: PgPool) -> Router {
    let protected = payplan::api::create_router().layer(middleware::from_fn_with_state(
        pool.clone(),
        payplan::api::middleware::auth_middleware,
    ));

    Router::new()
        .route("/register", post(payplan::api::routes::register))
        .nest("/api/v1", protected)
        .with_state(pool)
}

/// Unique email so tests never collide on the users table
#[allow(dead_code)]
pub fn unique_email(prefix: &str) -> String {
    format!("{}+{}@test.com", prefix, uuid::Uuid::new_v4())
}
