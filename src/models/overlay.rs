// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Telemetry text painted over the video.

/// The three telemetry lines, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayText {
    pub time: String,
    pub frame: String,
    pub motion: String,
}

impl OverlayText {
    pub fn new(seconds: f64, frame: usize, motion: f64) -> Self {
        Self {
            time: format!("Time: {:.3}s", seconds),
            frame: format!("Frame: {}", frame),
            motion: format!("Motion: {:.2}", motion),
        }
    }

    pub fn lines(&self) -> [&str; 3] {
        [&self.time, &self.frame, &self.motion]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_formatting() {
        let text = OverlayText::new(1.5, 45, 0.3333);
        assert_eq!(text.lines(), ["Time: 1.500s", "Frame: 45", "Motion: 0.33"]);
    }

    #[test]
    fn test_overlay_zero_state() {
        let text = OverlayText::new(0.0, 0, 0.0);
        assert_eq!(text.lines(), ["Time: 0.000s", "Frame: 0", "Motion: 0.00"]);
    }
}
