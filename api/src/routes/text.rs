//! Text toolbox endpoints

use axum::{Json, Router, extract::rejection::JsonRejection, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::domain::text_tools::{self, BoldStyle, TextOperation};
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/text/transform", post(transform))
        .route("/api/text/stats", post(stats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransformRequest {
    text: String,
    operation: TextOperation,
    #[serde(default)]
    bold_style: BoldStyle,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransformResponse {
    text: String,
    word_count: usize,
    char_count: usize,
}

#[derive(Debug, Deserialize)]
struct StatsRequest {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    word_count: usize,
    char_count: usize,
    sentence_count: usize,
}

async fn transform(
    body: Result<Json<TransformRequest>, JsonRejection>,
) -> Result<Json<TransformResponse>, ApiError> {
    let Json(req) = body?;
    let text = text_tools::apply(&req.text, req.operation, req.bold_style);

    Ok(Json(TransformResponse {
        word_count: text_tools::word_count(&text),
        char_count: text_tools::char_count(&text),
        text,
    }))
}

async fn stats(body: Result<Json<StatsRequest>, JsonRejection>) -> Result<Json<StatsResponse>, ApiError> {
    let Json(req) = body?;

    Ok(Json(StatsResponse {
        word_count: text_tools::word_count(&req.text),
        char_count: text_tools::char_count(&req.text),
        sentence_count: text_tools::sentence_count(&req.text),
    }))
}
