// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video canvas with the telemetry overlay.
//!
//! The canvas keeps a 16:9 shape inside the available space. The current
//! frame is aspect-fit into it, then the overlay (inset border and
//! telemetry text) is painted on top, anchored to the canvas edges.

use crate::models::overlay::OverlayText;
use crate::util::geometry::{fit_rect, inset_rect};

/// Canvas shape.
const CANVAS_ASPECT: (u32, u32) = (16, 9);
/// Distance between the canvas edge and the overlay border.
const BORDER_INSET: f32 = 8.0;
const BORDER_WIDTH: f32 = 2.0;
const TEXT_LEFT: f32 = 10.0;
const TEXT_SIZE: f32 = 16.0;
/// Spacing between the bottom-anchored text lines.
const LINE_STEP: f32 = 20.0;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    TogglePlay,
}

/// Something to paint as the video layer.
pub struct Picture<'a> {
    pub texture: &'a egui::TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Display the canvas: picture (or placeholder message) plus overlay.
pub fn show(
    ui: &mut egui::Ui,
    picture: Option<Picture<'_>>,
    placeholder: &str,
    overlay: &OverlayText,
) -> CanvasAction {
    let available = egui::Rect::from_min_size(ui.cursor().min, ui.available_size());
    let canvas_rect = fit_rect(CANVAS_ASPECT.0, CANVAS_ASPECT.1, available);
    let response = ui.allocate_rect(canvas_rect, egui::Sense::click());
    let painter = ui.painter_at(canvas_rect);

    painter.rect_filled(canvas_rect, 0.0, egui::Color32::BLACK);

    match picture {
        Some(picture) => {
            let image_rect = fit_rect(picture.width, picture.height, canvas_rect);
            painter.image(
                picture.texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        None => {
            painter.text(
                canvas_rect.center(),
                egui::Align2::CENTER_CENTER,
                placeholder,
                egui::FontId::proportional(TEXT_SIZE),
                egui::Color32::from_gray(160),
            );
        }
    }

    draw_overlay(&painter, canvas_rect, overlay);

    if response.clicked() {
        CanvasAction::TogglePlay
    } else {
        CanvasAction::None
    }
}

/// Paint the red border and the yellow telemetry lines.
fn draw_overlay(painter: &egui::Painter, canvas_rect: egui::Rect, overlay: &OverlayText) {
    painter.rect_stroke(
        inset_rect(canvas_rect, BORDER_INSET),
        0.0,
        egui::Stroke::new(BORDER_WIDTH, egui::Color32::RED),
    );

    // Bottom-anchored, last line sits on the canvas bottom edge.
    let lines = overlay.lines();
    for (i, line) in lines.iter().enumerate() {
        let from_bottom = (lines.len() - 1 - i) as f32 * LINE_STEP;
        painter.text(
            egui::pos2(canvas_rect.min.x + TEXT_LEFT, canvas_rect.max.y - from_bottom),
            egui::Align2::LEFT_BOTTOM,
            *line,
            egui::FontId::proportional(TEXT_SIZE),
            egui::Color32::YELLOW,
        );
    }
}
