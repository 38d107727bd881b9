// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Layout helpers for placing a video frame inside the canvas and for the
//! overlay border.

/// Largest size with the media's aspect ratio that fits in `available`.
pub fn fit_size(media_width: u32, media_height: u32, available: egui::Vec2) -> egui::Vec2 {
    if media_width == 0 || media_height == 0 || available.x <= 0.0 || available.y <= 0.0 {
        return egui::Vec2::ZERO;
    }

    let media_aspect = media_width as f32 / media_height as f32;
    let available_aspect = available.x / available.y;

    if media_aspect > available_aspect {
        // Media is wider - fit to width
        egui::vec2(available.x, available.x / media_aspect)
    } else {
        // Media is taller - fit to height
        egui::vec2(available.y * media_aspect, available.y)
    }
}

/// Aspect-fit the media into `area`, centered.
pub fn fit_rect(media_width: u32, media_height: u32, area: egui::Rect) -> egui::Rect {
    let size = fit_size(media_width, media_height, area.size());
    egui::Rect::from_center_size(area.center(), size)
}

/// Shrink a rectangle by `inset` on every side, never below zero size.
pub fn inset_rect(rect: egui::Rect, inset: f32) -> egui::Rect {
    let shrunk = rect.shrink(inset);
    if shrunk.width() < 0.0 || shrunk.height() < 0.0 {
        egui::Rect::from_center_size(rect.center(), egui::Vec2::ZERO)
    } else {
        shrunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_media_to_width() {
        let size = fit_size(1920, 1080, egui::vec2(800.0, 800.0));
        assert!((size.x - 800.0).abs() < 0.001);
        assert!((size.y - 450.0).abs() < 0.001);
    }

    #[test]
    fn test_fit_tall_media_to_height() {
        let size = fit_size(1080, 1920, egui::vec2(1600.0, 900.0));
        assert!((size.y - 900.0).abs() < 0.001);
        assert!((size.x - 506.25).abs() < 0.001);
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        assert_eq!(fit_size(0, 1080, egui::vec2(100.0, 100.0)), egui::Vec2::ZERO);
        assert_eq!(fit_size(1920, 1080, egui::vec2(0.0, 100.0)), egui::Vec2::ZERO);
    }

    #[test]
    fn test_fit_rect_is_centered() {
        let area = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1000.0, 1000.0));
        let rect = fit_rect(16, 9, area);
        assert_eq!(rect.center(), area.center());
        assert!((rect.min.y - 218.75).abs() < 0.001);
    }

    #[test]
    fn test_inset_rect() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(640.0, 360.0));
        let inset = inset_rect(rect, 8.0);
        assert_eq!(inset.min, egui::pos2(8.0, 8.0));
        assert_eq!(inset.max, egui::pos2(632.0, 352.0));

        let tiny = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(10.0, 10.0));
        assert_eq!(inset_rect(tiny, 8.0).size(), egui::Vec2::ZERO);
    }
}
