//! Text-to-image proxy

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::config::AppConfig;
use crate::services::error::ApiError;
use crate::services::image_gen::placeholder_data_url;
use crate::services::rate_limit::{IMAGE_GEN_BURST, IMAGE_GEN_REPLENISH_SECS, rate_limited};

pub fn routes(config: &AppConfig) -> Router<Arc<AppState>> {
    let router = Router::new().route("/api/generate-image", post(generate_image));
    if config.rate_limit_enabled {
        rate_limited(router, IMAGE_GEN_REPLENISH_SECS, IMAGE_GEN_BURST)
    } else {
        router
    }
}

#[derive(Debug, Deserialize)]
struct GenerateImageRequest {
    #[serde(default)]
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateImageResponse {
    success: bool,
    image_url: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// POST /api/generate-image
///
/// Upstream failures still answer 200 with a placeholder so the editor has
/// something to show; `success` tells the client whether to offer a retry.
async fn generate_image(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    let Json(req) = body?;

    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::validation("MISSING_PROMPT", "Prompt is required"));
    }

    let client = state.image_gen.as_ref().ok_or_else(|| {
        ApiError::unavailable(
            "IMAGE_GEN_UNAVAILABLE",
            "Image generation is not configured on this server",
        )
    })?;

    let response = match client.generate(prompt).await {
        Ok(image) => {
            tracing::info!(bytes = image.data.len(), content_type = %image.content_type, "generated image");
            GenerateImageResponse {
                success: true,
                image_url: image.data_url(),
                prompt: prompt.to_string(),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "image generation failed, returning placeholder");
            GenerateImageResponse {
                success: false,
                image_url: placeholder_data_url(prompt),
                prompt: prompt.to_string(),
                error: Some(e.to_string()),
            }
        }
    };

    Ok(Json(response))
}
