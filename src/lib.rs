//! Concesionario library
//!
//! Vehicle brand (`Marca`) and vehicle model (`Modelo`) management: a REST
//! backend over `sea-orm`, a typed HTTP client for it, and the Modelo update
//! workflow driven by that client.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod routing;
pub mod services;
pub mod tracing;
pub mod workflow;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

/// Application name used in alert headers and i18n keys.
pub const APPLICATION_NAME: &str = "concesionarioApp";

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config,
            services,
        }
    }
}

/// `/api/marcas` and `/api/modelos`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/marcas", handlers::marcas::marcas_routes())
        .nest("/modelos", handlers::modelos::modelos_routes())
}

/// Full application router with request ids and HTTP tracing applied.
///
/// Transport concerns that depend on deployment (CORS, compression) are
/// layered on by the server binary.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .merge(openapi::openapi_routes())
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(_) => "healthy",
        Err(e) => {
            ::tracing::warn!(error = %e, "health check could not reach the database");
            "unhealthy"
        }
    };

    Json(json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
