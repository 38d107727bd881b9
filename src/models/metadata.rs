// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sidecar metadata data structures.
//!
//! A sidecar is a JSON document stored next to a video (same base name)
//! carrying the frame rate and one motion value per frame. Every field is
//! optional and independently falls back to a default when it is missing
//! or has the wrong type.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Frame rate used when the sidecar does not provide a usable one.
pub const DEFAULT_FPS: f64 = 30.0;

fn default_fps() -> f64 {
    DEFAULT_FPS
}

/// Per-video metadata read from the JSON sidecar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SidecarMetadata {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: Option<String>,
    #[serde(default = "default_fps", deserialize_with = "lenient_fps")]
    pub fps: f64,
    #[serde(default, deserialize_with = "lenient_motion")]
    pub motion: Vec<f64>,
    #[serde(default, deserialize_with = "lenient_nframes")]
    pub nframes: u64,
}

impl Default for SidecarMetadata {
    fn default() -> Self {
        Self {
            name: None,
            fps: DEFAULT_FPS,
            motion: Vec::new(),
            nframes: 0,
        }
    }
}

impl SidecarMetadata {
    /// Parse a sidecar document. Never fails: unparseable input yields defaults.
    pub fn from_json_str(text: &str) -> Self {
        let value = match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => {
                log::warn!("Sidecar metadata is not a JSON object");
                return Self::default();
            }
            Err(e) => {
                log::warn!("Sidecar metadata is not valid JSON: {}", e);
                return Self::default();
            }
        };

        serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Failed to read sidecar metadata: {}", e);
            Self::default()
        })
    }

    /// Name to show for this video, derived from the media URL when absent.
    pub fn display_name(&self, media_url: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => name_from_url(media_url),
        }
    }

    /// Motion value for a frame, 0 past the end of the recorded values.
    pub fn motion_at(&self, frame: usize) -> f64 {
        self.motion.get(frame).copied().unwrap_or(0.0)
    }
}

/// File stem of the last path segment of a URL or path.
pub fn name_from_url(media_url: &str) -> String {
    let trimmed = media_url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segment = trimmed.rsplit(['/', '\\']).next().unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => segment.to_string(),
    }
}

fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => Some(name),
        _ => None,
    })
}

fn lenient_fps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .unwrap_or(DEFAULT_FPS),
        _ => DEFAULT_FPS,
    })
}

fn lenient_motion<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0))
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_nframes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => match n.as_u64() {
            Some(count) => count,
            None => n
                .as_f64()
                .filter(|count| count.is_finite() && *count > 0.0)
                .map(|count| count.floor() as u64)
                .unwrap_or(0),
        },
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_document() {
        let metadata = SidecarMetadata::from_json_str(
            r#"{"name": "rally 3", "fps": 60, "motion": [0.5, 1.25, 3], "nframes": 3}"#,
        );
        assert_eq!(metadata.name.as_deref(), Some("rally 3"));
        assert_eq!(metadata.fps, 60.0);
        assert_eq!(metadata.motion, vec![0.5, 1.25, 3.0]);
        assert_eq!(metadata.nframes, 3);
    }

    #[test]
    fn test_malformed_json_yields_defaults() {
        for text in ["", "not json", "{\"fps\": ", "[1, 2, 3]", "42", "null"] {
            assert_eq!(SidecarMetadata::from_json_str(text), SidecarMetadata::default());
        }
    }

    #[test]
    fn test_empty_object_yields_defaults() {
        let metadata = SidecarMetadata::from_json_str("{}");
        assert_eq!(metadata.fps, 30.0);
        assert!(metadata.motion.is_empty());
        assert_eq!(metadata.nframes, 0);
        assert_eq!(metadata.display_name("/pbvideo/sample.mp4"), "sample");
    }

    #[test]
    fn test_wrong_typed_fields_fall_back_independently() {
        let metadata = SidecarMetadata::from_json_str(
            r#"{"name": 7, "fps": "fast", "motion": {"0": 1}, "nframes": "many"}"#,
        );
        assert_eq!(metadata, SidecarMetadata::default());

        let metadata = SidecarMetadata::from_json_str(r#"{"fps": null, "motion": [1, 2]}"#);
        assert_eq!(metadata.fps, 30.0);
        assert_eq!(metadata.motion, vec![1.0, 2.0]);
    }

    #[test]
    fn test_unusable_fps_falls_back() {
        assert_eq!(SidecarMetadata::from_json_str(r#"{"fps": 0}"#).fps, 30.0);
        assert_eq!(SidecarMetadata::from_json_str(r#"{"fps": -24}"#).fps, 30.0);
        assert_eq!(SidecarMetadata::from_json_str(r#"{"fps": 29.97}"#).fps, 29.97);
    }

    #[test]
    fn test_non_numeric_motion_entries_read_as_zero() {
        let metadata = SidecarMetadata::from_json_str(r#"{"motion": [1.5, null, "x", 2]}"#);
        assert_eq!(metadata.motion, vec![1.5, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_nframes_coercion() {
        assert_eq!(SidecarMetadata::from_json_str(r#"{"nframes": 12.7}"#).nframes, 12);
        assert_eq!(SidecarMetadata::from_json_str(r#"{"nframes": -5}"#).nframes, 0);
    }

    #[test]
    fn test_motion_at_past_end_is_zero() {
        let metadata = SidecarMetadata::from_json_str(r#"{"motion": [0.25, 0.75]}"#);
        assert_eq!(metadata.motion_at(0), 0.25);
        assert_eq!(metadata.motion_at(1), 0.75);
        assert_eq!(metadata.motion_at(2), 0.0);
        assert_eq!(metadata.motion_at(10_000), 0.0);
    }

    #[test]
    fn test_name_from_url() {
        assert_eq!(name_from_url("http://host/pbvideo/match_01.mp4"), "match_01");
        assert_eq!(name_from_url("http://host/clip.mp4?token=abc"), "clip");
        assert_eq!(name_from_url("C:\\videos\\game.mp4"), "game");
        assert_eq!(name_from_url("noextension"), "noextension");
    }
}
