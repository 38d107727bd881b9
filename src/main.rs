// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PB Review - pickleball match footage reviewer
//!
//! A desktop application that plays a match video with a synchronized
//! overlay of per-frame telemetry (time, frame number and motion value)
//! read from a JSON sidecar file, with frame stepping and variable speed.

mod app;
mod cli;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::ReviewerApp;
use cli::Args;

fn main() -> Result<()> {
    // Initialize logging, `info` unless RUST_LOG says otherwise
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse_args();
    log::info!("Starting with {}", args.media);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.window_width, args.window_height])
            .with_min_inner_size([640.0, 480.0])
            .with_title("PB Review - Pickleball Match Reviewer"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "PB Review",
        options,
        Box::new(move |cc| Ok(Box::new(ReviewerApp::new(&args, &cc.egui_ctx)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
