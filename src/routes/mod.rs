//! API Routes
//!
//! - `POST /text-file/` - solve a prompt against an uploaded document
//! - `POST /text/` - solve a prompt on its own
//! - `GET /health` - liveness and model selection

pub mod form;
pub mod health;
pub mod solve;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;
use crate::types::AppResult;

/// Create the main application router with CORS, tracing and the upload size limit.
pub fn create_router(state: AppState) -> AppResult<Router> {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins)?;
    let body_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    Ok(Router::new()
        .merge(solve::router(state.clone()))
        .merge(health::router(state))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}
