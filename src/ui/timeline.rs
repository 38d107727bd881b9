// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video timeline scrubber control.
//!
//! This module provides the timeline scrubber for navigating through
//! the available frames.

/// Display the scrubber. Returns the frame to seek to when it was dragged.
pub fn show(ui: &mut egui::Ui, current_frame: usize, last_frame: Option<usize>) -> Option<usize> {
    let Some(last) = last_frame.filter(|last| *last > 0) else {
        ui.label(egui::RichText::new(format!("Frame {}", current_frame)).weak());
        return None;
    };

    let mut frame = current_frame.min(last);
    let mut seek = None;

    ui.horizontal(|ui| {
        ui.spacing_mut().slider_width = (ui.available_width() - 120.0).max(100.0);
        let response = ui.add(egui::Slider::new(&mut frame, 0..=last).text("frame"));
        if response.changed() {
            seek = Some(frame);
        }
    });

    seek
}
