//! Transcript normalization: re-time caption segments and optionally rewrite
//! monetary amounts into a target currency.
//!
//! Each segment is processed independently. A segment that cannot be
//! processed degrades to a zeroed default; it never fails the batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::currency::{Currency, CurrencyRewriter};

/// One caption unit as delivered by an upstream transcript source.
///
/// Fields are kept as raw JSON so a malformed item still reaches the
/// per-item degradation path instead of rejecting the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub text: Value,
    #[serde(default)]
    pub duration: Value,
    #[serde(default)]
    pub offset: Value,
    #[serde(default)]
    pub start: Value,
}

impl RawSegment {
    pub fn new(text: impl Into<String>, offset: f64, duration: f64) -> Self {
        Self {
            text: Value::String(text.into()),
            duration: Value::from(duration),
            offset: Value::from(offset),
            start: Value::Null,
        }
    }

    /// Caption text as a string, whatever JSON type it arrived as
    pub fn raw_text(&self) -> String {
        value_text(&self.text)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Display-ready segment. Wire keys follow the transcript API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSegment {
    pub text: String,
    #[serde(rename = "start")]
    pub formatted_start: String,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    #[serde(rename = "offset")]
    pub start_offset_seconds: f64,
    /// Set only when currency rewriting changed the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl FormattedSegment {
    fn degraded(text: String) -> Self {
        Self {
            text,
            formatted_start: "00:00".to_string(),
            duration_seconds: 0.0,
            start_offset_seconds: 0.0,
            original_text: None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SegmentError {
    #[error("segment text must be a string, got {0}")]
    NonStringText(&'static str),
    #[error("segment must be an object, got {0}")]
    NotAnObject(&'static str),
    #[error("malformed segment: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub format_currency: bool,
    pub target_currency: Currency,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            format_currency: true,
            target_currency: Currency::Idr,
        }
    }
}

/// Holds the compiled currency rules so they are built once per process
#[derive(Default)]
pub struct TranscriptNormalizer {
    rewriter: CurrencyRewriter,
}

impl TranscriptNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize every segment. Output is 1:1 with input, in the same order.
    pub fn normalize(&self, segments: &[RawSegment], options: &FormatOptions) -> Vec<FormattedSegment> {
        segments
            .iter()
            .enumerate()
            .map(|(index, raw)| self.format_or_degrade(index, raw, options))
            .collect()
    }

    /// Normalize a loosely typed batch where any item may not be a segment object.
    ///
    /// Items that are not objects degrade like any other bad segment, with their
    /// string form (empty for `null`) as the text.
    pub fn normalize_values(&self, items: Vec<Value>, options: &FormatOptions) -> Vec<FormattedSegment> {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                if !item.is_object() {
                    let error = SegmentError::NotAnObject(json_type(&item));
                    tracing::warn!(index, error = %error, "transcript segment degraded");
                    return FormattedSegment::degraded(value_text(&item));
                }
                match serde_json::from_value::<RawSegment>(item) {
                    Ok(raw) => self.format_or_degrade(index, &raw, options),
                    Err(e) => {
                        let error = SegmentError::Malformed(e.to_string());
                        tracing::warn!(index, error = %error, "transcript segment degraded");
                        FormattedSegment::degraded(String::new())
                    }
                }
            })
            .collect()
    }

    fn format_or_degrade(&self, index: usize, raw: &RawSegment, options: &FormatOptions) -> FormattedSegment {
        self.format_segment(index, raw, options).unwrap_or_else(|e| {
            tracing::warn!(index, error = %e, "transcript segment degraded");
            FormattedSegment::degraded(raw.raw_text())
        })
    }

    pub fn format_segment(
        &self,
        index: usize,
        raw: &RawSegment,
        options: &FormatOptions,
    ) -> Result<FormattedSegment, SegmentError> {
        let text = match &raw.text {
            Value::String(s) => s.as_str(),
            other => return Err(SegmentError::NonStringText(json_type(other))),
        };

        let duration = numeric(&raw.duration)
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(0.0);
        let start = resolve_start_offset(raw, index, duration);

        let (display_text, original_text) = if options.format_currency {
            let rewrite = self.rewriter.rewrite(text, options.target_currency);
            if rewrite.changed {
                (rewrite.text, Some(text.to_string()))
            } else {
                (text.to_string(), None)
            }
        } else {
            (text.to_string(), None)
        };

        Ok(FormattedSegment {
            text: display_text,
            formatted_start: format_time(start),
            duration_seconds: duration,
            start_offset_seconds: sanitize_offset(start),
            original_text,
        })
    }
}

/// Effective start of a segment in seconds.
///
/// Prefers `offset`, then `start`. When neither is present the start is
/// approximated as `index * duration`, which is only exact for uniform
/// segment lengths. A present but non-numeric field yields NaN, which
/// renders as `00:00`.
pub fn resolve_start_offset(raw: &RawSegment, index: usize, duration: f64) -> f64 {
    if !raw.offset.is_null() {
        return numeric(&raw.offset).unwrap_or(f64::NAN);
    }
    if !raw.start.is_null() {
        return numeric(&raw.start).unwrap_or(f64::NAN);
    }
    index as f64 * duration
}

/// Render seconds as `mm:ss`. NaN, infinities and negatives render as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{:02}:{:02}", minutes, secs)
}

/// [`format_time`] over arbitrary JSON; anything non-numeric renders as `00:00`.
pub fn format_time_value(value: &Value) -> String {
    numeric(value).map_or_else(|| "00:00".to_string(), format_time)
}

fn sanitize_offset(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds >= 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Numbers and numeric strings both count; sources disagree on which they send.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
