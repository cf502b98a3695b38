use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use http::{header::HeaderName, HeaderValue};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing::{error, info, warn};

use concesionario::{
    app_router,
    config::{self, AppConfig},
    db,
    handlers::common::{app_header, TOTAL_COUNT_HEADER},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("database unavailable")?;
    if cfg.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("failed to migrate the schema")?;
    }

    let cors = cors_layer(&cfg)?;
    let addr = SocketAddr::new(
        cfg.host
            .parse::<IpAddr>()
            .with_context(|| format!("invalid host {:?}", cfg.host))?,
        cfg.port,
    );

    let app = app_router(AppState::new(Arc::new(pool), cfg))
        .layer(CompressionLayer::new())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    info!("concesionario-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Browser clients must be able to read the pagination and alert headers.
fn exposed_headers() -> Vec<HeaderName> {
    vec![
        HeaderName::from_static(TOTAL_COUNT_HEADER),
        http::header::LINK,
        http::header::LOCATION,
        app_header("alert"),
        app_header("error"),
        app_header("params"),
    ]
}

fn cors_layer(cfg: &AppConfig) -> anyhow::Result<CorsLayer> {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(exposed_headers()));
    }

    if cfg.should_allow_permissive_cors() {
        info!(
            environment = %cfg.environment,
            "no CORS origins configured, allowing any origin"
        );
        return Ok(CorsLayer::permissive().expose_headers(exposed_headers()));
    }

    error!(
        "no usable CORS origins; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
    );
    anyhow::bail!("missing CORS configuration")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
