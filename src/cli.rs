// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line options.

use crate::models::transport::{PlaybackRate, PLAYBACK_RATES};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Video to open (local path, file:// or http(s):// URL ending in .mp4)
    #[arg(env = "PB_REVIEW_MEDIA", default_value = "pbvideo/sample.mp4")]
    pub media: String,

    /// Downscale decoded frames to at most this width (0 keeps the source size)
    #[arg(long, default_value_t = 1280)]
    pub max_width: u32,

    /// Initial playback rate
    #[arg(long, default_value = "1", value_parser = parse_rate)]
    pub rate: PlaybackRate,

    /// Initial window width
    #[arg(long, default_value_t = 1280.0)]
    pub window_width: f32,

    /// Initial window height
    #[arg(long, default_value_t = 800.0)]
    pub window_height: f32,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn parse_rate(value: &str) -> Result<PlaybackRate, String> {
    let multiplier: f64 = value
        .trim_end_matches('x')
        .parse()
        .map_err(|e| format!("invalid rate {:?}: {}", value, e))?;
    PlaybackRate::from_multiplier(multiplier)
        .ok_or_else(|| format!("rate must be one of {:?}", PLAYBACK_RATES))
}
