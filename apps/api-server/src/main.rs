//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use quill_core::ports::RateLimiter;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::rate_limit::RateLimitMiddleware;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;

    if let Some(admin) = config.admin.clone() {
        state
            .auth
            .ensure_admin(admin.into())
            .await
            .context("failed to bootstrap the admin account")?;
    }

    let limiter = build_rate_limiter(&config)?;
    let trust_proxy = config.trust_proxy;

    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(RateLimitMiddleware::new(limiter.clone()).trust_proxy(trust_proxy))
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .configure(handlers::configure_app(app_state.clone()))
            .default_service(web::to(handlers::route_not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");

    #[cfg(feature = "postgres")]
    if let Some(db) = state.db {
        db.close().await?;
    }

    Ok(())
}

#[cfg(feature = "rate-limit")]
fn build_rate_limiter(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn RateLimiter>>> {
    let limiter = quill_infra::InMemoryRateLimiter::new(config.rate_limit.clone())?;
    Ok(Some(Arc::new(limiter)))
}

#[cfg(not(feature = "rate-limit"))]
fn build_rate_limiter(_config: &AppConfig) -> anyhow::Result<Option<Arc<dyn RateLimiter>>> {
    Ok(None)
}
