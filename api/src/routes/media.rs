//! Media tool routes: raw bytes in, converted bytes out

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::IntoResponse,
    routing::post,
};
use std::sync::Arc;

use crate::AppState;
use crate::services::error::{ApiError, LogErr};
use crate::services::media_tools::{MediaToolError, TrimParams, convert_to_png};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/convert-image", post(convert_image))
        .route("/api/trim-video", post(trim_video))
}

fn media_error(err: MediaToolError) -> ApiError {
    match err {
        MediaToolError::InvalidParams(details) => ApiError::validation("INVALID_PARAMS", details),
        MediaToolError::Decode(details) => ApiError::validation("UNSUPPORTED_MEDIA", details),
        MediaToolError::Processing(_) | MediaToolError::EngineUnavailable(_) => {
            tracing::warn!(error = %err, "media engine failed");
            ApiError::unavailable("MEDIA_ENGINE_ERROR", err.to_string())
        }
    }
}

/// POST /api/convert-image - any decodable image in, PNG out
async fn convert_image(body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let png = tokio::task::spawn_blocking(move || convert_to_png(&body))
        .await
        .log_internal("Image conversion task failed")?
        .map_err(media_error)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// POST /api/trim-video?start=&end= - cut without re-encoding
async fn trim_video(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TrimParams>, QueryRejection>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;

    let trimmed = state
        .trimmer
        .trim(&body, params)
        .await
        .map_err(media_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"trimmed.mp4\""),
        ],
        trimmed,
    ))
}
