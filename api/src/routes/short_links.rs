//! Short link creation and redirect

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::Redirect,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::config::AppConfig;
use crate::domain::short_links::{generate_short_code, validate_target_url};
use crate::services::error::ApiError;
use crate::services::rate_limit::{SHORTEN_BURST, SHORTEN_REPLENISH_SECS, rate_limited};

pub fn routes(config: &AppConfig) -> Router<Arc<AppState>> {
    let create = Router::new().route("/api/shorten", post(shorten));
    let create = if config.rate_limit_enabled {
        rate_limited(create, SHORTEN_REPLENISH_SECS, SHORTEN_BURST)
    } else {
        create
    };

    create.route("/{short_code}", get(follow))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShortenRequest {
    #[serde(default)]
    long_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShortenResponse {
    short_code: String,
    short_url: String,
}

/// POST /api/shorten
async fn shorten(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, ApiError> {
    let Json(req) = body?;

    let long_url = req
        .long_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::validation("MISSING_URL", "URL is required"))?;

    let target = validate_target_url(long_url)
        .ok_or_else(|| ApiError::validation("INVALID_URL", "Invalid URL format"))?;

    // Store the normalized form so the redirect never carries raw control or non-ASCII bytes.
    let short_code = state.short_links.create(target.as_str(), &generate_short_code());
    tracing::info!(short_code = %short_code, "created short link");

    Ok(Json(ShortenResponse {
        short_url: format!("{}/{}", state.config.public_base_url, short_code),
        short_code,
    }))
}

/// GET /{short_code} - unknown or expired codes go to the fallback location
async fn follow(State(state): State<Arc<AppState>>, Path(short_code): Path<String>) -> Redirect {
    match state.short_links.get(&short_code) {
        Some(target) => Redirect::temporary(&target),
        None => {
            tracing::debug!(short_code = %short_code, "short link missing or expired");
            Redirect::temporary(&state.config.fallback_redirect)
        }
    }
}
