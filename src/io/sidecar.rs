// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sidecar file discovery and loading.
//!
//! The metadata JSON and the thumbnail JPEG live next to the video and
//! share its base name. Locations may be local paths, `file://` URLs or
//! `http(s)://` URLs.

use crate::models::metadata::SidecarMetadata;
use anyhow::{Context, Result};

/// Locations of the files stored alongside a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarUrls {
    pub metadata: String,
    pub thumbnail: String,
}

impl SidecarUrls {
    /// Derive sidecar locations by swapping the trailing `.mp4`.
    pub fn from_media_url(media_url: &str) -> Option<Self> {
        let base = media_url.strip_suffix(".mp4")?;
        Some(Self {
            metadata: format!("{}.json", base),
            thumbnail: format!("{}.jpg", base),
        })
    }
}

/// Raw bytes of a fetched resource.
pub struct Fetched {
    pub bytes: Vec<u8>,
    /// Response content type; `None` for local files
    pub content_type: Option<String>,
}

impl Fetched {
    /// Local files are trusted; HTTP responses must declare JSON.
    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(true)
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve a non-remote location to a filesystem path.
pub fn local_path(location: &str) -> &str {
    location.strip_prefix("file://").unwrap_or(location)
}

/// Fetch a resource from a local path or over HTTP.
pub fn fetch(location: &str) -> Result<Fetched> {
    if is_remote(location) {
        let mut response = ureq::get(location)
            .call()
            .with_context(|| format!("Request failed: {}", location))?;
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .body_mut()
            .read_to_vec()
            .with_context(|| format!("Failed to read response body: {}", location))?;
        Ok(Fetched { bytes, content_type })
    } else {
        let path = local_path(location);
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
        Ok(Fetched {
            bytes,
            content_type: None,
        })
    }
}

/// Load the sidecar metadata for a video. Never fails: every problem is
/// logged and produces the default metadata.
pub fn load_metadata(media_url: &str) -> SidecarMetadata {
    let Some(urls) = SidecarUrls::from_media_url(media_url) else {
        log::warn!("No sidecar metadata for {} (not an .mp4 URL)", media_url);
        return SidecarMetadata::default();
    };

    match fetch(&urls.metadata) {
        Ok(fetched) => metadata_from_fetched(&urls.metadata, fetched),
        Err(e) => {
            log::error!("JSON load error: {:#}", e);
            SidecarMetadata::default()
        }
    }
}

/// Parse a fetched sidecar, rejecting responses not declared as JSON.
pub fn metadata_from_fetched(location: &str, fetched: Fetched) -> SidecarMetadata {
    if !fetched.is_json() {
        log::error!(
            "JSON load error: {} is not JSON ({})",
            location,
            fetched.content_type.unwrap_or_default()
        );
        return SidecarMetadata::default();
    }
    SidecarMetadata::from_json_str(&String::from_utf8_lossy(&fetched.bytes))
}

/// Decoded thumbnail pixels (RGBA).
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Load the optional `.jpg` thumbnail stored next to a video.
pub fn load_thumbnail(media_url: &str) -> Result<Thumbnail> {
    let urls = SidecarUrls::from_media_url(media_url)
        .with_context(|| format!("No thumbnail for {} (not an .mp4 URL)", media_url))?;
    let fetched = fetch(&urls.thumbnail)?;
    let img = image::load_from_memory(&fetched.bytes)
        .with_context(|| format!("Failed to decode thumbnail {}", urls.thumbnail))?
        .to_rgba8();

    Ok(Thumbnail {
        width: img.width(),
        height: img.height(),
        pixels: img.into_raw(),
    })
}

/// Everything loaded from the sidecar files of one video.
pub struct Sidecar {
    pub media_url: String,
    pub metadata: SidecarMetadata,
    pub thumbnail: Option<Thumbnail>,
}

/// Load metadata and thumbnail for a video.
pub fn load_sidecar(media_url: &str) -> Sidecar {
    let metadata = load_metadata(media_url);
    let thumbnail = match load_thumbnail(media_url) {
        Ok(thumbnail) => Some(thumbnail),
        Err(e) => {
            log::debug!("Thumbnail unavailable: {:#}", e);
            None
        }
    };

    Sidecar {
        media_url: media_url.to_string(),
        metadata,
        thumbnail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_urls() {
        let urls = SidecarUrls::from_media_url("http://host/pbvideo/sample.mp4").unwrap();
        assert_eq!(urls.metadata, "http://host/pbvideo/sample.json");
        assert_eq!(urls.thumbnail, "http://host/pbvideo/sample.jpg");
    }

    #[test]
    fn test_sidecar_urls_only_replace_trailing_extension() {
        let urls = SidecarUrls::from_media_url("/videos/a.mp4.backup/b.mp4").unwrap();
        assert_eq!(urls.metadata, "/videos/a.mp4.backup/b.json");
        assert!(SidecarUrls::from_media_url("/videos/clip.mov").is_none());
    }

    #[test]
    fn test_local_path_strips_file_scheme() {
        assert_eq!(local_path("file:///tmp/x.json"), "/tmp/x.json");
        assert_eq!(local_path("/tmp/x.json"), "/tmp/x.json");
    }

    fn served(body: &str, content_type: Option<&str>) -> Fetched {
        Fetched {
            bytes: body.as_bytes().to_vec(),
            content_type: content_type.map(str::to_string),
        }
    }

    #[test]
    fn test_content_type_gate() {
        assert!(!served("", Some("text/html")).is_json());
        assert!(served("", Some("application/json; charset=utf-8")).is_json());
        assert!(served("", None).is_json());
    }

    #[test]
    fn test_non_json_response_yields_defaults() {
        let body = r#"{"fps": 60, "motion": [1, 2, 3], "nframes": 3}"#;
        let metadata = metadata_from_fetched("http://host/a.json", served(body, Some("text/html")));
        assert_eq!(metadata, SidecarMetadata::default());

        let metadata = metadata_from_fetched(
            "http://host/a.json",
            served(body, Some("application/json; charset=utf-8")),
        );
        assert_eq!(metadata.fps, 60.0);
        assert_eq!(metadata.nframes, 3);
    }

    #[test]
    fn test_load_metadata_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("rally.mp4");
        std::fs::write(
            dir.path().join("rally.json"),
            r#"{"fps": 25, "motion": [0.1, 0.2], "nframes": 2}"#,
        )
        .unwrap();

        let metadata = load_metadata(media.to_str().unwrap());
        assert_eq!(metadata.fps, 25.0);
        assert_eq!(metadata.motion, vec![0.1, 0.2]);
        assert_eq!(metadata.nframes, 2);
        assert_eq!(metadata.display_name(media.to_str().unwrap()), "rally");
    }

    #[test]
    fn test_missing_metadata_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("missing.mp4");
        assert_eq!(load_metadata(media.to_str().unwrap()), SidecarMetadata::default());
    }

    #[test]
    fn test_malformed_metadata_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("broken.mp4");
        std::fs::write(dir.path().join("broken.json"), "{ fps: thirty").unwrap();
        assert_eq!(load_metadata(media.to_str().unwrap()), SidecarMetadata::default());
    }

    #[test]
    fn test_load_sidecar_with_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("serve.mp4");
        image::RgbImage::from_pixel(4, 2, image::Rgb([200, 10, 10]))
            .save(dir.path().join("serve.jpg"))
            .unwrap();

        let url = format!("file://{}", media.display());
        let sidecar = load_sidecar(&url);
        let thumbnail = sidecar.thumbnail.expect("thumbnail should load");
        assert_eq!((thumbnail.width, thumbnail.height), (4, 2));
        assert_eq!(thumbnail.pixels.len(), 4 * 2 * 4);
        assert_eq!(sidecar.metadata, SidecarMetadata::default());
    }
}
