//! Application setup and server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, http::HeaderValue, http::Method, routing::get};
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::{AppError, Result};
use crate::models::ServerConfig;
use crate::pipeline::PipelineContext;
use crate::server::routes::{images_handler, progress_handler, zip_handler};

/// Build the Axum application router.
pub fn build_router(ctx: PipelineContext) -> Router {
    let cors = cors_layer(&ctx.config.server);

    Router::new()
        .route("/images", get(images_handler))
        .route("/progress/:job_id", get(progress_handler))
        .route("/zip", get(zip_handler))
        .layer(cors)
        .with_state(ctx)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if config.allowed_origins.iter().any(|o| o.trim() == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Run the server until Ctrl-C, then drop every tracked job.
pub async fn serve(ctx: PipelineContext) -> Result<()> {
    let addr: SocketAddr = ctx
        .config
        .server
        .bind
        .parse()
        .map_err(|e| AppError::config(format!("invalid bind address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let sweeper = spawn_eviction(&ctx);

    log::info!("Listening on http://{}", addr);
    axum::serve(listener, build_router(ctx.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    let jobs = ctx.jobs.snapshot().await;
    let unfinished = jobs.iter().filter(|job| !job.is_finished()).count();
    ctx.jobs.clear().await;
    log::info!(
        "Server stopped; released {} jobs ({} still processing)",
        jobs.len(),
        unfinished
    );
    Ok(())
}

fn spawn_eviction(ctx: &PipelineContext) -> Option<JoinHandle<()>> {
    let ttl_secs = ctx.config.jobs.ttl_secs;
    if ttl_secs == 0 {
        return None;
    }

    let jobs = ctx.jobs.clone();
    let ttl = Duration::from_secs(ttl_secs);
    let period = Duration::from_secs(ctx.config.jobs.sweep_interval_secs.max(1));

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = jobs.evict_expired(ttl).await;
            if evicted > 0 {
                log::info!("Evicted {} expired jobs", evicted);
            }
        }
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    log::info!("Shutdown signal received");
}
