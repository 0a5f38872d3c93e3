//! Media tools - thin wrappers over external engines.
//!
//! Used by:
//! - `/api/convert-image` (image decoding/encoding via the `image` crate)
//! - `/api/trim-video` (stream-copy trimming via the `ffmpeg` binary)

use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, ErrorKind};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Error types for media tool operations
#[derive(Debug, thiserror::Error)]
pub enum MediaToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Unsupported or corrupt input: {0}")]
    Decode(String),
    #[error("Processing error: {0}")]
    Processing(String),
    #[error("Media engine unavailable: {0}")]
    EngineUnavailable(String),
}

/// Decode any image format the `image` crate recognises and re-encode it as PNG
pub fn convert_to_png(data: &[u8]) -> Result<Vec<u8>, MediaToolError> {
    if data.is_empty() {
        return Err(MediaToolError::InvalidParams("image body is empty".into()));
    }

    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| MediaToolError::Decode(format!("Failed to read image: {}", e)))?
        .decode()
        .map_err(|e| MediaToolError::Decode(format!("Failed to decode image: {}", e)))?;

    let mut output = Cursor::new(Vec::new());
    img.write_to(&mut output, image::ImageFormat::Png)
        .map_err(|e| MediaToolError::Processing(format!("Failed to encode image: {}", e)))?;

    Ok(output.into_inner())
}

/// Parameters for trimming a video, in seconds from the start
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrimParams {
    pub start: f64,
    pub end: f64,
}

impl TrimParams {
    pub fn validate(&self) -> Result<(), MediaToolError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(MediaToolError::InvalidParams("start and end must be numbers".into()));
        }
        if self.start < 0.0 {
            return Err(MediaToolError::InvalidParams("start must not be negative".into()));
        }
        if self.end <= self.start {
            return Err(MediaToolError::InvalidParams("end must be after start".into()));
        }
        Ok(())
    }

    /// ffmpeg arguments for a lossless cut between `start` and `end`
    fn ffmpeg_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), input.as_os_str().to_owned()];
        args.extend(
            [
                "-ss".to_string(),
                format!("{:.3}", self.start),
                "-to".to_string(),
                format!("{:.3}", self.end),
                "-c:v".to_string(),
                "copy".to_string(),
                "-c:a".to_string(),
                "copy".to_string(),
                "-y".to_string(),
            ]
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Temp files owned by one trim. Removed on drop, including when the request
/// future is cancelled mid-run.
struct TempFiles(Vec<PathBuf>);

impl TempFiles {
    fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self(paths.into_iter().collect())
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file")
                }
            }
        }
    }
}

/// Runs the external ffmpeg binary over temp files
#[derive(Debug, Clone)]
pub struct VideoTrimmer {
    ffmpeg_path: String,
}

impl VideoTrimmer {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub async fn trim(&self, data: &[u8], params: TrimParams) -> Result<Vec<u8>, MediaToolError> {
        params.validate()?;
        if data.is_empty() {
            return Err(MediaToolError::InvalidParams("video body is empty".into()));
        }

        let temp_dir = std::env::temp_dir();
        let input_path = temp_dir.join(format!("mediakit_trim_input_{}.tmp", rand::random::<u64>()));
        let output_path = temp_dir.join(format!("mediakit_trim_output_{}.mp4", rand::random::<u64>()));
        let _cleanup = TempFiles::new([input_path.clone(), output_path.clone()]);

        tokio::fs::write(&input_path, data)
            .await
            .map_err(|e| MediaToolError::Processing(format!("Failed to write temp input: {}", e)))?;

        let result = Command::new(&self.ffmpeg_path)
            .args(params.ffmpeg_args(&input_path, &output_path))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MediaToolError::EngineUnavailable(format!(
                    "{} not found",
                    self.ffmpeg_path
                )));
            }
            Err(e) => {
                return Err(MediaToolError::EngineUnavailable(format!(
                    "Failed to spawn ffmpeg: {}",
                    e
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaToolError::Processing(format!(
                "ffmpeg trim failed: {}",
                stderr.trim()
            )));
        }

        let trimmed = tokio::fs::read(&output_path)
            .await
            .map_err(|e| MediaToolError::Processing(format!("Failed to read trimmed output: {}", e)));

        tracing::info!(
            start = params.start,
            end = params.end,
            input_bytes = data.len(),
            "trimmed video"
        );
        trimmed
    }
}
