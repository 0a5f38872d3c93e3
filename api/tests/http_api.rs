//! HTTP integration tests
//!
//! Drive the full router with `oneshot`. Transcripts come from an in-process
//! stub so nothing here touches the network.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use async_trait::async_trait;
use mediakit_api::config::AppConfig;
use mediakit_api::domain::transcript::RawSegment;
use mediakit_api::services::youtube::{TranscriptSource, TranscriptSourceError};
use mediakit_api::{AppState, build_app};
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

enum StubTranscripts {
    Segments(Vec<RawSegment>),
    Failing,
}

#[async_trait]
impl TranscriptSource for StubTranscripts {
    async fn fetch(&self, video_id: &str) -> Result<Vec<RawSegment>, TranscriptSourceError> {
        match self {
            StubTranscripts::Segments(segments) => Ok(segments.clone()),
            StubTranscripts::Failing => Err(TranscriptSourceError::NoCaptions(video_id.to_string())),
        }
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        public_base_url: "http://short.test".to_string(),
        rate_limit_enabled: false,
        ffmpeg_path: "/nonexistent/ffmpeg-for-tests".to_string(),
        ..AppConfig::default()
    }
}

fn app_with(config: AppConfig, source: StubTranscripts) -> Router {
    let state = AppState::with_transcript_source(config, Arc::new(source)).unwrap();
    build_app(Arc::new(state))
}

fn app() -> Router {
    app_with(test_config(), StubTranscripts::Segments(Vec::new()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Short links
// ============================================================================

#[tokio::test]
async fn test_shorten_then_redirect() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/shorten",
            json!({ "longUrl": "https://example.com/some/long/path?q=1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let code = body["shortCode"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert_eq!(body["shortUrl"], format!("http://short.test/{}", code));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", code))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/some/long/path?q=1"
    );
}

#[tokio::test]
async fn test_shorten_normalizes_non_ascii_and_control_targets() {
    let app = app();
    let cases = [
        ("https://example.com/a\u{1}b", "https://example.com/a%01b"),
        ("https://example.com/café", "https://example.com/caf%C3%A9"),
    ];

    for (long_url, location) in cases {
        let response = app
            .clone()
            .oneshot(post_json("/api/shorten", json!({ "longUrl": long_url })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let code = json_body(response).await["shortCode"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/{}", code))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], location);
    }
}

#[tokio::test]
async fn test_unknown_code_redirects_to_fallback() {
    let response = app()
        .oneshot(Request::builder().uri("/zzzzzz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_shorten_validation() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/shorten", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "MISSING_URL");

    let response = app
        .clone()
        .oneshot(post_json("/api/shorten", json!({ "longUrl": "not a url" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_URL");

    let response = app
        .oneshot(post_json("/api/shorten", json!({ "longUrl": "javascript:alert(1)" })))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["code"], "INVALID_URL");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/shorten")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_shorten_is_rate_limited_per_ip() {
    let config = AppConfig {
        rate_limit_enabled: true,
        ..test_config()
    };
    let app = app_with(config, StubTranscripts::Segments(Vec::new()));

    let shorten = || {
        Request::builder()
            .method("POST")
            .uri("/api/shorten")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(r#"{"longUrl":"https://example.com"}"#))
            .unwrap()
    };

    for _ in 0..10 {
        let response = app.clone().oneshot(shorten()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(shorten()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

// ============================================================================
// Transcripts
// ============================================================================

#[tokio::test]
async fn test_get_transcript_formats_segments() {
    let app = app_with(
        test_config(),
        StubTranscripts::Segments(vec![
            RawSegment::new("Harga Rp 50.000", 1.5, 2.0),
            RawSegment::new("Halo semua", 61.0, 1.0),
        ]),
    );

    let response = app
        .oneshot(post_json(
            "/api/get-transcript",
            json!({ "videoUrl": VIDEO_URL, "targetCurrency": "USD" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["videoId"], "dQw4w9WgXcQ");
    assert_eq!(body["metadata"]["currencyFormatted"], true);
    assert_eq!(body["metadata"]["targetCurrency"], "USD");
    assert!(body["metadata"]["processedAt"].is_string());

    let transcript = body["transcript"].as_array().unwrap();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0]["text"], "Harga $3.23");
    assert_eq!(transcript[0]["originalText"], "Harga Rp 50.000");
    assert_eq!(transcript[0]["start"], "00:01");
    assert_eq!(transcript[1]["text"], "Halo semua");
    assert_eq!(transcript[1]["start"], "01:01");
    assert!(transcript[1].get("originalText").is_none());
}

#[tokio::test]
async fn test_get_transcript_empty_is_not_found() {
    let response = app()
        .oneshot(post_json("/api/get-transcript", json!({ "videoUrl": VIDEO_URL })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["code"], "NO_TRANSCRIPT");
    assert_eq!(body["error"], "Transcript Not Found");
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_transcript_source_failure_is_unavailable() {
    let app = app_with(test_config(), StubTranscripts::Failing);

    let response = app
        .oneshot(post_json("/api/get-transcript", json!({ "videoUrl": VIDEO_URL })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["code"], "PROCESSING_ERROR");
}

#[tokio::test]
async fn test_get_transcript_validation() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/get-transcript", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "MISSING_URL");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/get-transcript",
            json!({ "videoUrl": "https://vimeo.com/123456" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"], "Please enter a valid YouTube URL");

    let response = app
        .oneshot(post_json(
            "/api/get-transcript",
            json!({ "videoUrl": VIDEO_URL, "targetCurrency": "EUR" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["details"],
        "Currency must be either USD or IDR"
    );
}

#[tokio::test]
async fn test_format_transcript_degrades_bad_items() {
    let response = app()
        .oneshot(post_json(
            "/api/format-transcript",
            json!({
                "segments": [
                    { "text": "Harga Rp 50.000", "offset": 65, "duration": 2 },
                    { "text": 42, "duration": 3 },
                    { "text": "tanpa angka", "duration": 4 },
                    null,
                    "plain string"
                ],
                "targetCurrency": "USD"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let segments = body["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 5);

    assert_eq!(segments[0]["text"], "Harga $3.23");
    assert_eq!(segments[0]["start"], "01:05");

    assert_eq!(segments[1]["text"], "42");
    assert_eq!(segments[1]["start"], "00:00");
    assert_eq!(segments[1]["duration"], 0.0);
    assert_eq!(segments[1]["offset"], 0.0);

    assert_eq!(segments[2]["text"], "tanpa angka");
    assert_eq!(segments[2]["start"], "00:08");
    assert_eq!(segments[2]["offset"], 8.0);
    assert!(segments[2].get("originalText").is_none());

    assert_eq!(segments[3]["text"], "");
    assert_eq!(segments[3]["start"], "00:00");
    assert_eq!(segments[4]["text"], "plain string");
    assert_eq!(segments[4]["start"], "00:00");
    assert_eq!(segments[4]["offset"], 0.0);
}

// ============================================================================
// Text, image and media tools
// ============================================================================

#[tokio::test]
async fn test_text_transform_and_stats() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/text/transform",
            json!({ "text": "hello world", "operation": "capitalize" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "text": "Hello World", "wordCount": 2, "charCount": 11 })
    );

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/text/transform",
            json!({ "text": "x", "operation": "explode" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/api/text/stats", json!({ "text": "One. Two!" })))
        .await
        .unwrap();
    assert_eq!(
        json_body(response).await,
        json!({ "wordCount": 2, "charCount": 9, "sentenceCount": 2 })
    );
}

#[tokio::test]
async fn test_generate_image_requires_prompt_and_token() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/generate-image", json!({ "prompt": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/api/generate-image", json!({ "prompt": "a cat" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["code"], "IMAGE_GEN_UNAVAILABLE");
}

#[tokio::test]
async fn test_convert_image() {
    let img = image::RgbImage::from_pixel(3, 2, image::Rgb([0, 128, 255]));
    let mut bmp = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut bmp, image::ImageFormat::Bmp)
        .unwrap();

    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/convert-image")
                .body(Body::from(bmp.into_inner()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3, 2));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/convert-image")
                .body(Body::from("garbage"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "UNSUPPORTED_MEDIA");
}

#[tokio::test]
async fn test_trim_video_validation() {
    let app = app();

    let trim = |query: &str| {
        Request::builder()
            .method("POST")
            .uri(format!("/api/trim-video?{}", query))
            .body(Body::from("not really a video"))
            .unwrap()
    };

    let response = app.clone().oneshot(trim("start=5&end=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_PARAMS");

    let response = app.clone().oneshot(trim("start=abc&end=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_QUERY");

    let response = app.oneshot(trim("start=0&end=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["code"], "MEDIA_ENGINE_ERROR");
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}
