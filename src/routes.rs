//! Defines routes for paste submission, retrieval and listing.
//!
//! ## Structure
//! - `POST /`         — submit a paste (form body)
//! - `GET  /recent`   — public feed, `?p=` selects the page
//! - `GET  /history`  — pastes of the caller's owner cookie
//! - `GET  /latest`   — redirect to the newest listed paste
//! - `GET  /archive.tar.gz` — backup of the public feed
//! - `GET  /{id}`     — raw paste text
//! - `GET  /healthz`, `GET /readyz` — probes
//!
//! Static segments take priority over `/{id}`.

use crate::{
    config::AppConfig,
    handlers::{
        health_handlers::{healthz, readyz},
        paste_handlers::{
            export_archive, get_paste, latest_paste, paste_history, recent_pastes, submit_paste,
        },
    },
    services::paste_service::PasteService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Slack for form field names and percent-encoding on top of the paste limit.
const FORM_OVERHEAD: usize = 4096;

/// Build the router for all paste routes.
pub fn routes() -> Router<PasteService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/", post(submit_paste))
        .route("/recent", get(recent_pastes))
        .route("/history", get(paste_history))
        .route("/latest", get(latest_paste))
        .route("/archive.tar.gz", get(export_archive))
        .route("/{id}", get(get_paste))
}

/// Attach layers and state, yielding the service the server runs.
pub fn app(service: PasteService) -> Router {
    // urlencoding can triple the size of a value
    let body_limit = service
        .limits()
        .max_paste_size
        .saturating_mul(3)
        .saturating_add(FORM_OVERHEAD);

    routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Bind the configured address. A wildcard host that the process may not
/// bind is retried on loopback with the same port.
pub async fn bind_listener(cfg: &AppConfig) -> anyhow::Result<TcpListener> {
    let addr = cfg.addr();
    let err = match TcpListener::bind(&addr).await {
        Ok(listener) => return Ok(listener),
        Err(err) => err,
    };

    let wildcard = matches!(cfg.host.as_str(), "0.0.0.0" | "::");
    if err.kind() != ErrorKind::PermissionDenied || !wildcard {
        return Err(err.into());
    }

    let loopback = format!("127.0.0.1:{}", cfg.port);
    tracing::warn!("cannot bind {addr} ({err}), using {loopback}");
    Ok(TcpListener::bind(&loopback).await?)
}
