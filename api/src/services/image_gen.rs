//! Text-to-image proxy for a hosted diffusion model.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::constants::{GENERATED_IMAGE_SIZE, PLACEHOLDER_PROMPT_CHARS};

#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inference API error ({status}): {body}")]
    Api { status: u16, body: String },
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    num_inference_steps: u32,
    guidance_scale: f32,
    negative_prompt: &'static str,
    width: u32,
    height: u32,
    scheduler: &'static str,
}

#[derive(Serialize)]
struct InferenceOptions {
    use_gpu: bool,
    wait_for_model: bool,
}

/// A generated image and its MIME type
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub content_type: String,
    pub data: Bytes,
}

impl GeneratedImage {
    pub fn data_url(&self) -> String {
        data_url(&self.content_type, &self.data)
    }
}

#[derive(Clone)]
pub struct ImageGenClient {
    http: Client,
    model_url: String,
    access_token: String,
}

impl ImageGenClient {
    pub fn new(model_url: &str, access_token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            model_url: model_url.to_string(),
            access_token: access_token.to_string(),
        })
    }

    /// Run one inference request. Small, CPU-friendly settings keep cold starts tolerable.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                num_inference_steps: 20,
                guidance_scale: 7.0,
                negative_prompt: "low quality, bad anatomy, blurry",
                width: GENERATED_IMAGE_SIZE,
                height: GENERATED_IMAGE_SIZE,
                scheduler: "DPMSolverMultistep",
            },
            options: InferenceOptions {
                use_gpu: false,
                wait_for_model: true,
            },
        };

        let resp = self
            .http
            .post(&self.model_url)
            .bearer_auth(&self.access_token)
            .header("X-Use-Cache", "false")
            .header("X-Wait-For-Model", "true")
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ImageGenError::Api { status, body });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or("image/jpeg")
            .to_string();

        let data = resp.bytes().await?;
        Ok(GeneratedImage { content_type, data })
    }
}

pub fn data_url(content_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(data))
}

/// SVG shown in place of a generated image while the model is unavailable
pub fn placeholder_svg(prompt: &str) -> String {
    let mut label: String = prompt.chars().take(PLACEHOLDER_PROMPT_CHARS).collect();
    if prompt.chars().count() > PLACEHOLDER_PROMPT_CHARS {
        label.push_str("...");
    }

    format!(
        r##"<svg width="{size}" height="{size}" xmlns="http://www.w3.org/2000/svg">
    <rect width="100%" height="100%" fill="#f0f0f0"/>
    <text x="50%" y="45%" font-family="Arial" font-size="16" fill="#666" text-anchor="middle">{label}</text>
    <text x="50%" y="55%" font-family="Arial" font-size="14" fill="#999" text-anchor="middle">Processing... Please try again</text>
</svg>"##,
        size = GENERATED_IMAGE_SIZE,
        label = escape_xml(&label),
    )
}

pub fn placeholder_data_url(prompt: &str) -> String {
    data_url("image/svg+xml", placeholder_svg(prompt).as_bytes())
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
