//! YouTube caption fetching.
//!
//! Captions come from the public timedtext endpoint in its JSON3 format.
//! Tracks are tried in order: video default, Indonesian, English.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use crate::domain::transcript::RawSegment;

const TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";
const FALLBACK_LANGUAGES: [Option<&str>; 3] = [None, Some("id"), Some("en")];

static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*((youtu\.be/)|(v/)|(/u/\w/)|(embed/)|(watch\?))\??v?=?([^#&?]*).*")
        .unwrap_or_else(|e| panic!("invalid video id pattern: {e}"))
});

#[derive(Debug, thiserror::Error)]
pub enum TranscriptSourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("caption endpoint returned status {0}")]
    Status(u16),
    #[error("no caption track available for video {0}")]
    NoCaptions(String),
    #[error("malformed caption payload: {0}")]
    Parse(String),
}

/// Anything that can produce raw caption segments for a video id
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<RawSegment>, TranscriptSourceError>;
}

#[derive(Clone)]
pub struct YoutubeTranscriptClient {
    http: Client,
}

impl YoutubeTranscriptClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    async fn fetch_with_fallback(
        &self,
        video_id: &str,
    ) -> Result<Vec<RawSegment>, TranscriptSourceError> {
        let mut last_error = TranscriptSourceError::NoCaptions(video_id.to_string());

        for lang in FALLBACK_LANGUAGES {
            match self.fetch_track(video_id, lang).await {
                Ok(segments) => {
                    tracing::debug!(video_id, lang = lang.unwrap_or("default"), count = segments.len(), "fetched caption track");
                    return Ok(segments);
                }
                Err(e) => {
                    tracing::debug!(video_id, lang = lang.unwrap_or("default"), error = %e, "caption track unavailable");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn fetch_track(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Vec<RawSegment>, TranscriptSourceError> {
        let mut query = vec![("v", video_id), ("fmt", "json3")];
        if let Some(lang) = lang {
            query.push(("lang", lang));
        }

        let resp = self.http.get(TIMEDTEXT_URL).query(&query).send().await?;
        if !resp.status().is_success() {
            return Err(TranscriptSourceError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Err(TranscriptSourceError::NoCaptions(video_id.to_string()));
        }

        parse_json3(&body)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptClient {
    async fn fetch(&self, video_id: &str) -> Result<Vec<RawSegment>, TranscriptSourceError> {
        self.fetch_with_fallback(video_id).await
    }
}

#[derive(Debug, Deserialize)]
struct Json3Track {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: Option<f64>,
    #[serde(default)]
    d_duration_ms: Option<f64>,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Turn a JSON3 caption document into raw segments, skipping events with no text
pub fn parse_json3(body: &str) -> Result<Vec<RawSegment>, TranscriptSourceError> {
    let track: Json3Track =
        serde_json::from_str(body).map_err(|e| TranscriptSourceError::Parse(e.to_string()))?;

    let segments = track
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(RawSegment::new(
                text,
                event.t_start_ms.unwrap_or(0.0) / 1000.0,
                event.d_duration_ms.unwrap_or(0.0) / 1000.0,
            ))
        })
        .collect();

    Ok(segments)
}

/// Accept any well-formed URL that points at youtube.com or youtu.be
pub fn is_youtube_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok()
        && (candidate.contains("youtube.com/") || candidate.contains("youtu.be/"))
}

/// Extract the 11-character video id from the common YouTube URL shapes
pub fn extract_video_id(url: &str) -> Option<String> {
    let caps = VIDEO_ID_PATTERN.captures(url)?;
    let id = caps.get(7)?.as_str();
    (id.len() == 11).then(|| id.to_string())
}
