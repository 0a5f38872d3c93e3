//! Backend for the media editor: short links, YouTube transcripts with
//! currency rewriting, a text-to-image proxy and a few media helpers.

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod routes;
pub mod services;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use config::AppConfig;
use domain::short_links::{MemoryShortLinkStore, ShortLinkStore};
use domain::transcript::TranscriptNormalizer;
use services::image_gen::ImageGenClient;
use services::media_tools::VideoTrimmer;
use services::youtube::{TranscriptSource, YoutubeTranscriptClient};

/// Shared application state, handed to every handler as `State<Arc<AppState>>`
pub struct AppState {
    pub config: AppConfig,
    pub short_links: Arc<dyn ShortLinkStore>,
    pub normalizer: TranscriptNormalizer,
    pub transcripts: Arc<dyn TranscriptSource>,
    /// `None` when no inference token is configured
    pub image_gen: Option<ImageGenClient>,
    pub trimmer: VideoTrimmer,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self, reqwest::Error> {
        let transcripts = Arc::new(YoutubeTranscriptClient::new(config.transcript_timeout)?);
        Self::with_transcript_source(config, transcripts)
    }

    /// Build state around a caller-supplied transcript source
    pub fn with_transcript_source(
        config: AppConfig,
        transcripts: Arc<dyn TranscriptSource>,
    ) -> Result<Self, reqwest::Error> {
        let image_gen = match &config.hf_access_token {
            Some(token) => Some(ImageGenClient::new(
                &config.hf_model_url,
                token,
                config.image_timeout,
            )?),
            None => None,
        };

        Ok(Self {
            short_links: Arc::new(MemoryShortLinkStore::default()),
            normalizer: TranscriptNormalizer::new(),
            transcripts,
            image_gen,
            trimmer: VideoTrimmer::new(config.ffmpeg_path.clone()),
            config,
        })
    }
}

/// Full HTTP application: routes plus CORS and body-size layers
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    routes::build_routes(&state.config)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}
