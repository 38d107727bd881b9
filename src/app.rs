// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module owns the loaded video (sidecar metadata, thumbnail and
//! decoded frames), the playback transport and the keyboard bindings,
//! and coordinates the background loaders with the UI components.

use crate::cli::Args;
use crate::io::media::{DecodeEvent, DecodeWorker, DecodedFrame, StreamInfo};
use crate::io::sidecar::{load_sidecar, Sidecar};
use crate::models::{
    metadata::{name_from_url, SidecarMetadata, DEFAULT_FPS},
    overlay::OverlayText,
    transport::Transport,
};
use crate::ui::{canvas, timeline, toolbar};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::Instant;

/// An uploaded texture and the size of the pixels behind it.
struct Layer {
    texture: egui::TextureHandle,
    width: u32,
    height: u32,
}

impl Layer {
    fn picture(&self) -> canvas::Picture<'_> {
        canvas::Picture {
            texture: &self.texture,
            width: self.width,
            height: self.height,
        }
    }
}

/// Transport commands bound to keys and menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    TogglePlay,
    StepBackward,
    StepForward,
    Faster,
    Slower,
}

/// Map pressed keys to transport commands.
fn key_commands(input: &egui::InputState) -> Vec<Command> {
    let bindings = [
        (egui::Key::Space, Command::TogglePlay),
        (egui::Key::ArrowLeft, Command::StepBackward),
        (egui::Key::ArrowRight, Command::StepForward),
        (egui::Key::ArrowUp, Command::Faster),
        (egui::Key::ArrowDown, Command::Slower),
    ];
    bindings
        .iter()
        .filter(|(key, _)| input.key_pressed(*key))
        .map(|(_, command)| *command)
        .collect()
}

/// Apply a transport command.
fn apply(transport: &mut Transport, command: Command) {
    match command {
        Command::TogglePlay => transport.toggle_play(),
        Command::StepBackward => transport.step(-1),
        Command::StepForward => transport.step(1),
        Command::Faster => transport.faster(),
        Command::Slower => transport.slower(),
    }
}

/// Number of frames the transport may move through.
///
/// Decoded frames win once any exist. While the decoder has not produced
/// its first frame the playhead holds at frame 0. Without a decoder the
/// sidecar's `nframes` applies, then the container's frame count.
fn available_frames(
    decoded: usize,
    decoding: bool,
    metadata: &SidecarMetadata,
    stream: Option<&StreamInfo>,
) -> Option<usize> {
    if decoded > 0 {
        Some(decoded)
    } else if decoding {
        Some(0)
    } else if metadata.nframes > 0 {
        usize::try_from(metadata.nframes).ok()
    } else {
        stream.map(|info| info.frame_count).filter(|count| *count > 0)
    }
}

/// Main application state.
pub struct ReviewerApp {
    /// Contents of the URL field (may differ from the loaded URL while editing)
    url_input: String,

    /// Currently loaded media URL
    media_url: String,

    /// Decode downscale bound
    max_width: u32,

    /// Sidecar metadata for the current video
    metadata: SidecarMetadata,

    /// Receiver for background sidecar loading
    sidecar_loader: Option<Receiver<Sidecar>>,

    /// Running decode worker, `None` once it finished or failed
    decoder: Option<DecodeWorker>,

    /// Stream properties reported by the decoder
    stream_info: Option<StreamInfo>,

    /// Every frame decoded so far, indexed by frame number
    frames: Vec<DecodedFrame>,

    /// Thumbnail shown until the first frame is decoded
    thumbnail: Option<Layer>,

    /// Texture holding the frame currently on screen, with its index
    frame_layer: Option<(usize, Layer)>,

    transport: Transport,

    /// Time of the previous update, for advancing the playhead
    last_tick: Option<Instant>,
}

impl ReviewerApp {
    /// Create the application and start loading the initial video.
    pub fn new(args: &Args, ctx: &egui::Context) -> Self {
        let mut app = Self {
            url_input: args.media.clone(),
            media_url: String::new(),
            max_width: args.max_width,
            metadata: SidecarMetadata::default(),
            sidecar_loader: None,
            decoder: None,
            stream_info: None,
            frames: Vec::new(),
            thumbnail: None,
            frame_layer: None,
            transport: Transport::new(DEFAULT_FPS, args.rate),
            last_tick: None,
        };
        app.load_media(args.media.clone(), ctx);
        app
    }

    /// Replace the current video: release everything tied to the previous
    /// URL, then start loading sidecar files and decoding in the background.
    fn load_media(&mut self, media_url: String, ctx: &egui::Context) {
        self.unload();

        log::info!("Loading {}", media_url);
        self.media_url = media_url.clone();
        self.url_input = media_url.clone();
        self.transport = Transport::new(DEFAULT_FPS, self.transport.rate());

        let (sender, receiver) = channel();
        self.sidecar_loader = Some(receiver);
        let sidecar_url = media_url.clone();
        let sidecar_ctx = ctx.clone();
        std::thread::spawn(move || {
            let sidecar = load_sidecar(&sidecar_url);
            let _ = sender.send(sidecar);
            sidecar_ctx.request_repaint();
        });

        self.decoder = Some(DecodeWorker::spawn(media_url, self.max_width, Some(ctx.clone())));
    }

    /// Drop the decoder, decoded frames and textures of the current video.
    fn unload(&mut self) {
        if !self.frames.is_empty() {
            log::info!("Releasing {} decoded frames", self.frames.len());
        }
        // Dropping the receivers stops both background threads from
        // delivering stale results.
        self.decoder = None;
        self.sidecar_loader = None;
        self.stream_info = None;
        self.frames = Vec::new();
        self.thumbnail = None;
        self.frame_layer = None;
        self.metadata = SidecarMetadata::default();
    }

    fn is_decoding(&self) -> bool {
        self.decoder.is_some()
    }

    fn is_loading(&self) -> bool {
        self.sidecar_loader.is_some() || self.is_decoding()
    }

    fn display_name(&self) -> String {
        if self.media_url.is_empty() {
            return name_from_url(&self.url_input);
        }
        self.metadata.display_name(&self.media_url)
    }

    /// Pick up a finished sidecar load.
    fn poll_sidecar(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.sidecar_loader else {
            return;
        };
        let sidecar = match receiver.try_recv() {
            Ok(sidecar) => sidecar,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.sidecar_loader = None;
                return;
            }
        };
        self.sidecar_loader = None;

        if sidecar.media_url != self.media_url {
            log::debug!("Discarding sidecar for {}", sidecar.media_url);
            return;
        }

        log::info!(
            "Metadata for {}: {} fps, {} motion values, {} frames",
            sidecar.media_url,
            sidecar.metadata.fps,
            sidecar.metadata.motion.len(),
            sidecar.metadata.nframes
        );
        self.transport.set_fps(sidecar.metadata.fps);
        self.metadata = sidecar.metadata;

        if let Some(thumbnail) = sidecar.thumbnail {
            let size = [thumbnail.width as usize, thumbnail.height as usize];
            let image = egui::ColorImage::from_rgba_unmultiplied(size, &thumbnail.pixels);
            self.thumbnail = Some(Layer {
                texture: ctx.load_texture("thumbnail", image, egui::TextureOptions::LINEAR),
                width: thumbnail.width,
                height: thumbnail.height,
            });
        }
    }

    /// Drain everything the decoder has produced since the last update.
    fn poll_decoder(&mut self) {
        let Some(decoder) = &self.decoder else {
            return;
        };

        let mut done = false;
        loop {
            match decoder.events.try_recv() {
                Ok(DecodeEvent::Opened(info)) => self.stream_info = Some(info),
                Ok(DecodeEvent::Frame(frame)) => {
                    debug_assert_eq!(frame.index, self.frames.len());
                    self.frames.push(frame);
                }
                Ok(DecodeEvent::Finished) => {
                    log::info!("Decoded {} frames from {}", self.frames.len(), self.media_url);
                    done = true;
                    break;
                }
                Ok(DecodeEvent::Failed(message)) => {
                    log::warn!("Decoding stopped for {}: {}", self.media_url, message);
                    done = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    done = true;
                    break;
                }
            }
        }

        if done {
            self.decoder = None;
        }
    }

    /// Make sure the texture matches the frame under the playhead.
    fn sync_frame_layer(&mut self, ctx: &egui::Context) {
        let Some(last) = self.frames.len().checked_sub(1) else {
            self.frame_layer = None;
            return;
        };
        let index = self.transport.current_frame().min(last);
        if matches!(&self.frame_layer, Some((shown, _)) if *shown == index) {
            return;
        }

        let frame = &self.frames[index];
        let size = [frame.width as usize, frame.height as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);

        match &mut self.frame_layer {
            Some((shown, layer)) => {
                layer.texture.set(image, egui::TextureOptions::LINEAR);
                layer.width = frame.width;
                layer.height = frame.height;
                *shown = index;
            }
            None => {
                let texture = ctx.load_texture("frame", image, egui::TextureOptions::LINEAR);
                self.frame_layer = Some((
                    index,
                    Layer {
                        texture,
                        width: frame.width,
                        height: frame.height,
                    },
                ));
            }
        }
    }

    fn open_file_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Video", &["mp4"])
            .pick_file()
        {
            self.load_media(path.to_string_lossy().to_string(), ctx);
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) -> Option<Command> {
        let mut command = None;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Video...").clicked() {
                        self.open_file_dialog(ctx);
                        ui.close_menu();
                    }
                    if ui.button("Reload").clicked() {
                        self.load_media(self.media_url.clone(), ctx);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Playback", |ui| {
                    let entries = [
                        ("Play/Pause (Space)", Command::TogglePlay),
                        ("Previous Frame (←)", Command::StepBackward),
                        ("Next Frame (→)", Command::StepForward),
                        ("Faster (↑)", Command::Faster),
                        ("Slower (↓)", Command::Slower),
                    ];
                    for (label, entry) in entries {
                        if ui.button(label).clicked() {
                            command = Some(entry);
                            ui.close_menu();
                        }
                    }
                });
            });
        });

        command
    }
}

impl eframe::App for ReviewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_sidecar(ctx);
        self.poll_decoder();

        let decoding = self.is_decoding();
        let limit = available_frames(
            self.frames.len(),
            decoding,
            &self.metadata,
            self.stream_info.as_ref(),
        );
        self.transport.set_frame_limit(limit, decoding);

        // Advance the playhead by wall-clock time
        let now = Instant::now();
        if let Some(last_tick) = self.last_tick {
            self.transport.advance(now - last_tick);
        }
        self.last_tick = Some(now);

        let mut commands = Vec::new();
        commands.extend(self.menu_bar(ctx));

        // Keyboard transport, unless a text field is being edited
        if !ctx.wants_keyboard_input() {
            commands.extend(ctx.input(key_commands));
        }

        // Toolbar
        let name = self.display_name();
        let status = toolbar::TransportStatus {
            name: &name,
            playing: self.transport.is_playing(),
            rate: self.transport.rate(),
            fps: self.transport.fps(),
            decoded_frames: self.frames.len(),
            decoding: self.is_decoding(),
        };
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &mut self.url_input, &self.media_url, &status))
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::LoadUrl => {
                let url = self.url_input.trim().to_string();
                if !url.is_empty() && url != self.media_url {
                    self.load_media(url, ctx);
                }
            }
            toolbar::ToolbarAction::BrowseForFile => self.open_file_dialog(ctx),
            toolbar::ToolbarAction::None => {}
        }

        // Timeline (bottom)
        let seek = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| {
                timeline::show(ui, self.transport.current_frame(), self.transport.last_frame())
            })
            .inner;
        if let Some(frame) = seek {
            self.transport.pause();
            self.transport.seek_frame(frame);
        }

        for command in commands {
            log::debug!("{:?}", command);
            apply(&mut self.transport, command);
        }

        self.sync_frame_layer(ctx);

        let frame = self.transport.current_frame();
        let overlay = OverlayText::new(
            self.transport.elapsed_seconds(),
            frame,
            self.metadata.motion_at(frame),
        );

        // Canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_gray(24)))
            .show(ctx, |ui| {
                let picture = self
                    .frame_layer
                    .as_ref()
                    .map(|(_, layer)| layer.picture())
                    .or_else(|| self.thumbnail.as_ref().map(Layer::picture));
                let placeholder = if self.is_decoding() {
                    "Loading video…"
                } else {
                    "No video frames"
                };
                canvas::show(ui, picture, placeholder, &overlay)
            })
            .inner;

        if let canvas::CanvasAction::TogglePlay = canvas_action {
            apply(&mut self.transport, Command::TogglePlay);
        }

        if self.transport.is_playing() || self.is_loading() {
            ctx.request_repaint();
        }
    }
}
