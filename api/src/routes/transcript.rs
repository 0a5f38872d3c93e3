//! Transcript endpoints: fetch from YouTube, or format segments the client already has

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::AppState;
use crate::domain::currency::Currency;
use crate::domain::transcript::{FormatOptions, FormattedSegment};
use crate::services::error::{ApiError, LogErr};
use crate::services::youtube::{extract_video_id, is_youtube_url};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/get-transcript", post(get_transcript))
        .route("/api/format-transcript", post(format_transcript))
}

const NO_TRANSCRIPT_SUGGESTIONS: &[&str] = &[
    "The video may not have automatic captions yet",
    "Wait a moment, YouTube may still be processing captions",
    "Try another video that has captions",
];

const PROCESSING_SUGGESTIONS: &[&str] = &[
    "Wait a few minutes and try again",
    "Newly uploaded videos may need time to generate captions",
    "Make sure the video is not private and allows captions",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptRequest {
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    format_currency: Option<bool>,
    #[serde(default)]
    target_currency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptMetadata {
    processed_at: DateTime<Utc>,
    currency_formatted: bool,
    target_currency: Currency,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptResponse {
    success: bool,
    transcript: Vec<FormattedSegment>,
    video_id: String,
    metadata: TranscriptMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormatRequest {
    // Items stay untyped so a single non-object item degrades instead of failing the batch
    segments: Vec<serde_json::Value>,
    #[serde(default)]
    format_currency: Option<bool>,
    #[serde(default)]
    target_currency: Option<String>,
}

#[derive(Debug, Serialize)]
struct FormatResponse {
    segments: Vec<FormattedSegment>,
}

/// Map the optional request fields onto options. Anything but USD/IDR is rejected.
fn format_options(
    format_currency: Option<bool>,
    target_currency: Option<&str>,
) -> Result<FormatOptions, ApiError> {
    let defaults = FormatOptions::default();
    let target_currency = match target_currency {
        None => defaults.target_currency,
        Some("USD") => Currency::Usd,
        Some("IDR") => Currency::Idr,
        Some(_) => {
            return Err(ApiError::validation(
                "VALIDATION_ERROR",
                "Currency must be either USD or IDR",
            ));
        }
    };

    Ok(FormatOptions {
        format_currency: format_currency.unwrap_or(defaults.format_currency),
        target_currency,
    })
}

fn validate_video_url(video_url: &str) -> Result<String, ApiError> {
    if Url::parse(video_url).is_err() {
        return Err(ApiError::validation("VALIDATION_ERROR", "Please enter a valid URL"));
    }
    if !is_youtube_url(video_url) {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            "Please enter a valid YouTube URL",
        ));
    }
    extract_video_id(video_url)
        .ok_or_else(|| ApiError::validation("VALIDATION_ERROR", "Invalid YouTube URL"))
}

/// POST /api/get-transcript
async fn get_transcript(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let Json(req) = body?;

    let video_url = req
        .video_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            ApiError::validation(
                "MISSING_URL",
                "Please paste a YouTube video URL to get its transcript",
            )
            .with_title("Missing YouTube URL")
        })?;

    let video_id = validate_video_url(video_url)?;
    let options = format_options(req.format_currency, req.target_currency.as_deref())?;

    let fetched = tokio::time::timeout(
        state.config.transcript_timeout,
        state.transcripts.fetch(&video_id),
    )
    .await;

    let raw = fetched
        .map_err(|_| "timed out waiting for captions".to_string())
        .and_then(|result| result.map_err(|e| e.to_string()))
        .log_unavailable("Could not load captions for this video", "PROCESSING_ERROR")
        .map_err(|e| {
            e.with_title("Caption Processing Error")
                .with_suggestions(PROCESSING_SUGGESTIONS)
        })?;

    if raw.is_empty() {
        return Err(ApiError::not_found(
            "NO_TRANSCRIPT",
            "Could not find any captions for this video",
        )
        .with_title("Transcript Not Found")
        .with_suggestions(NO_TRANSCRIPT_SUGGESTIONS));
    }

    let transcript = state.normalizer.normalize(&raw, &options);
    tracing::info!(
        video_id = %video_id,
        segments = transcript.len(),
        currency_formatted = options.format_currency,
        "transcript processed"
    );

    Ok(Json(TranscriptResponse {
        success: true,
        transcript,
        video_id,
        metadata: TranscriptMetadata {
            processed_at: Utc::now(),
            currency_formatted: options.format_currency,
            target_currency: options.target_currency,
        },
    }))
}

/// POST /api/format-transcript
async fn format_transcript(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FormatRequest>, JsonRejection>,
) -> Result<Json<FormatResponse>, ApiError> {
    let Json(req) = body?;
    let options = format_options(req.format_currency, req.target_currency.as_deref())?;

    Ok(Json(FormatResponse {
        segments: state.normalizer.normalize_values(req.segments, &options),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_options_defaults() {
        let options = format_options(None, None).unwrap();
        assert!(options.format_currency);
        assert_eq!(options.target_currency, Currency::Idr);
    }

    #[test]
    fn test_format_options_rejects_unknown_currency() {
        let err = format_options(Some(true), Some("EUR")).unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.details, "Currency must be either USD or IDR");

        let options = format_options(Some(false), Some("USD")).unwrap();
        assert!(!options.format_currency);
        assert_eq!(options.target_currency, Currency::Usd);
    }

    #[test]
    fn test_validate_video_url() {
        assert_eq!(
            validate_video_url("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            validate_video_url("not a url").unwrap_err().details,
            "Please enter a valid URL"
        );
        assert_eq!(
            validate_video_url("https://vimeo.com/12345").unwrap_err().details,
            "Please enter a valid YouTube URL"
        );
        assert_eq!(
            validate_video_url("https://www.youtube.com/watch?v=short").unwrap_err().details,
            "Invalid YouTube URL"
        );
    }
}
