// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback transport state.
//!
//! Tracks the playhead position in seconds, play/pause state, the
//! selected playback rate and how many frames are available to step
//! through. Frame numbers are always derived from the position with
//! [`frame_at`], so the overlay and the displayed frame never disagree.

use std::time::Duration;

/// The fixed set of playback rates, slowest first.
pub const PLAYBACK_RATES: [f64; 3] = [0.1, 1.0, 10.0];

/// Absorbs float error so that `n as f64 / fps` maps back to frame `n`.
const FRAME_SNAP: f64 = 1e-6;

/// Frame index shown at `seconds` for a video running at `fps`.
pub fn frame_at(seconds: f64, fps: f64) -> usize {
    if seconds.is_nan() || seconds <= 0.0 || !fps.is_finite() || fps <= 0.0 {
        return 0;
    }
    (seconds * fps + FRAME_SNAP).floor() as usize
}

/// Playback rate, always one of [`PLAYBACK_RATES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRate(usize);

impl Default for PlaybackRate {
    fn default() -> Self {
        Self(1)
    }
}

impl PlaybackRate {
    /// Rate matching `multiplier` exactly, if it is in the fixed set.
    pub fn from_multiplier(multiplier: f64) -> Option<Self> {
        PLAYBACK_RATES
            .iter()
            .position(|rate| *rate == multiplier)
            .map(Self)
    }

    pub fn multiplier(self) -> f64 {
        PLAYBACK_RATES[self.0]
    }

    /// Next faster rate, wrapping to the slowest.
    pub fn faster(self) -> Self {
        Self((self.0 + 1) % PLAYBACK_RATES.len())
    }

    /// Next slower rate, wrapping to the fastest.
    pub fn slower(self) -> Self {
        Self((self.0 + PLAYBACK_RATES.len() - 1) % PLAYBACK_RATES.len())
    }
}

impl std::fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

/// Playhead and transport controls.
#[derive(Debug, Clone)]
pub struct Transport {
    /// Playhead position in seconds
    position: f64,
    playing: bool,
    rate: PlaybackRate,
    fps: f64,
    /// Number of frames that can be shown, if known
    frame_limit: Option<usize>,
    /// More frames are still arriving; playback holds at the last one
    /// instead of stopping
    growing: bool,
}

impl Transport {
    pub fn new(fps: f64, rate: PlaybackRate) -> Self {
        Self {
            position: 0.0,
            playing: false,
            rate,
            fps,
            frame_limit: None,
            growing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.position
    }

    pub fn current_frame(&self) -> usize {
        frame_at(self.position, self.fps)
    }

    /// Index of the last frame that can be shown. `Some(0)` when no frames
    /// are available yet but the limit is known.
    pub fn last_frame(&self) -> Option<usize> {
        self.frame_limit.map(|count| count.saturating_sub(1))
    }

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
        // Restart from the beginning when play is pressed at the end.
        if self.playing && !self.growing && self.at_end() {
            self.position = 0.0;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn faster(&mut self) {
        self.rate = self.rate.faster();
    }

    pub fn slower(&mut self) {
        self.rate = self.rate.slower();
    }

    /// Pause and move `delta` frames, clamped to the available frames.
    pub fn step(&mut self, delta: i64) {
        self.pause();
        let target = (self.current_frame() as i64).saturating_add(delta).max(0);
        self.seek_frame(usize::try_from(target).unwrap_or(usize::MAX));
    }

    /// Jump to a frame, clamped to the available frames.
    pub fn seek_frame(&mut self, frame: usize) {
        let frame = self.clamp_frame(frame);
        self.position = frame as f64 / self.fps;
    }

    /// Advance the playhead by wall-clock time scaled by the rate.
    /// Stops at the last available frame.
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }
        self.position += elapsed.as_secs_f64() * self.rate.multiplier();

        if let Some(last) = self.last_frame() {
            if self.current_frame() >= last {
                self.position = last as f64 / self.fps;
                self.playing = self.growing;
            }
        }
    }

    /// Change the frame rate, keeping the current frame index.
    pub fn set_fps(&mut self, fps: f64) {
        if !fps.is_finite() || fps <= 0.0 || fps == self.fps {
            return;
        }
        let frame = self.current_frame();
        self.fps = fps;
        self.position = frame as f64 / fps;
    }

    /// Update the number of frames available and re-clamp the playhead.
    /// `growing` marks a limit that will increase (frames still decoding).
    pub fn set_frame_limit(&mut self, limit: Option<usize>, growing: bool) {
        self.frame_limit = limit;
        self.growing = growing;
        let frame = self.current_frame();
        if self.clamp_frame(frame) != frame {
            self.seek_frame(frame);
        }
    }

    fn at_end(&self) -> bool {
        self.last_frame()
            .map(|last| self.current_frame() >= last)
            .unwrap_or(false)
    }

    fn clamp_frame(&self, frame: usize) -> usize {
        match self.last_frame() {
            Some(last) => frame.min(last),
            None => frame,
        }
    }
}
