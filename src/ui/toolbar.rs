// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the media URL field and transport status.

use crate::models::transport::PlaybackRate;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    /// The URL field was committed (Enter or focus loss)
    LoadUrl,
    BrowseForFile,
}

/// How an edit of the URL field ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditOutcome {
    Editing,
    Commit,
    Revert,
}

/// Enter or clicking away commits; Escape also drops focus but reverts.
fn edit_outcome(lost_focus: bool, escape_pressed: bool) -> EditOutcome {
    match (lost_focus, escape_pressed) {
        (false, _) => EditOutcome::Editing,
        (true, true) => EditOutcome::Revert,
        (true, false) => EditOutcome::Commit,
    }
}

/// What the status line shows.
pub struct TransportStatus<'a> {
    pub name: &'a str,
    pub playing: bool,
    pub rate: PlaybackRate,
    pub fps: f64,
    pub decoded_frames: usize,
    pub decoding: bool,
}

/// Display the toolbar.
pub fn show(
    ui: &mut egui::Ui,
    url_input: &mut String,
    loaded_url: &str,
    status: &TransportStatus<'_>,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Video:");

        let field_width = (ui.available_width() - 90.0).max(120.0);
        let response = ui.add(
            egui::TextEdit::singleline(url_input)
                .desired_width(field_width)
                .hint_text("path or URL to an .mp4"),
        );
        let escape_pressed = ui.input(|i| i.key_pressed(egui::Key::Escape));
        match edit_outcome(response.lost_focus(), escape_pressed) {
            EditOutcome::Commit => action = ToolbarAction::LoadUrl,
            EditOutcome::Revert => *url_input = loaded_url.to_string(),
            EditOutcome::Editing => {}
        }

        if ui.button("Open…").clicked() {
            action = ToolbarAction::BrowseForFile;
        }
    });

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(status.name).strong());
        ui.separator();
        ui.label(if status.playing { "▶ Playing" } else { "⏸ Paused" });
        ui.separator();
        ui.label(format!("Speed {}", status.rate));
        ui.separator();
        ui.label(format!("{} fps", status.fps));
        ui.separator();
        if status.decoding {
            ui.spinner();
            ui.label(format!("Decoding… {} frames", status.decoded_frames));
        } else {
            ui.label(format!("{} frames decoded", status.decoded_frames));
        }
        ui.separator();
        ui.label(
            egui::RichText::new("Space play/pause · ←/→ step · ↑/↓ speed")
                .italics()
                .weak(),
        );
    });

    action
}
