//! payplan - Installment Payment Plan Backend API
//!
//! Merchants split a total amount owed by a user into monthly installments;
//! the API tracks due/paid/late status over time and a background scheduler
//! advances statuses daily.

use std::net::SocketAddr;

use axum::{middleware, Router};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
mod config;
mod db;
pub mod domain;
mod error;
pub mod handlers;
pub mod jobs;
pub mod queries;

pub use config::Config;
pub use error::{AppError, AppResult};

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payplan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router
fn build_router(pool: PgPool) -> Router {
    // Create API router with all routes
    let api_router = api::create_router();

    // Apply middleware to API routes
    // Note: Axum layers are applied in reverse order (last added = first executed)
    // Order: logging -> auth -> handler
    let protected_routes = api_router
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            api::middleware::auth_middleware,
        ))
        .layer(middleware::from_fn(api::middleware::logging_middleware));

    Router::new()
        // Health check and registration (no auth)
        .route("/health", axum::routing::get(health_check))
        .route("/register", axum::routing::post(api::routes::register))
        // Protected API routes
        .nest("/api/v1", protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting payplan server");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    // Verify database connectivity and schema
    db::verify_connection(&pool).await?;
    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");
    tracing::info!("Listening on http://{}", addr);

    // Start the daily installment lifecycle jobs
    let scheduler = jobs::JobScheduler::with_config(
        pool.clone(),
        jobs::JobSchedulerConfig {
            sweep_interval: config.sweep_interval,
            notify_interval: config.notify_interval,
            upcoming_horizon_days: config.upcoming_horizon_days,
        },
    );
    let scheduler_handle = scheduler.start();

    // Build router and start server
    let app = build_router(pool.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    scheduler_handle.abort();
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
