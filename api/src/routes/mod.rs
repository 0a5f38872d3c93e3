pub mod image_gen;
pub mod media;
pub mod short_links;
pub mod text;
pub mod transcript;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::AppState;
use crate::config::AppConfig;

async fn health() -> &'static str {
    "ok"
}

/// Build all routes for the API
pub fn build_routes(config: &AppConfig) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(image_gen::routes(config))
        .merge(media::routes())
        .merge(text::routes())
        .merge(transcript::routes())
        .merge(short_links::routes(config))
}
