pub mod health;
pub mod index;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::watermark::handlers;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::health_handler))
        .route("/watermark", post(handlers::handle_watermark))
        .route("/layout", post(handlers::handle_layout))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
