// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video demuxing and decoding.
//!
//! Frames are decoded on a background thread and streamed to the UI over
//! a channel. The UI keeps every decoded frame for the session; dropping
//! the receiving end stops the worker.

use anyhow::Result;
use std::sync::mpsc::{channel, Receiver, Sender};

/// A decoded video frame in RGBA.
pub struct DecodedFrame {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Properties reported by the container when the stream is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub fps: f64,
    /// Frame count from the container, 0 when unknown
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
}

/// Something that yields decoded frames in presentation order.
pub trait FrameSource: Send {
    fn info(&self) -> StreamInfo;

    /// Decode the next frame, `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>>;
}

/// Progress messages sent by the decode worker.
pub enum DecodeEvent {
    Opened(StreamInfo),
    Frame(DecodedFrame),
    Finished,
    Failed(String),
}

/// Open a decoder for a local path or URL.
///
/// `max_width` bounds the decoded frame width (0 keeps the source size).
#[cfg(feature = "video-opencv")]
pub fn open_source(media_url: &str, max_width: u32) -> Result<Box<dyn FrameSource>> {
    let location = crate::io::sidecar::local_path(media_url);
    Ok(Box::new(opencv_source::OpencvSource::open(location, max_width)?))
}

#[cfg(not(feature = "video-opencv"))]
pub fn open_source(media_url: &str, _max_width: u32) -> Result<Box<dyn FrameSource>> {
    anyhow::bail!(
        "Cannot decode {}: built without video support (enable the video-opencv feature)",
        media_url
    )
}

/// Handle to a running decode thread.
pub struct DecodeWorker {
    pub events: Receiver<DecodeEvent>,
}

impl DecodeWorker {
    /// Start decoding `media_url` in the background.
    pub fn spawn(media_url: String, max_width: u32, ctx: Option<egui::Context>) -> Self {
        Self::spawn_with(move || open_source(&media_url, max_width), ctx)
    }

    /// Run `open` on the worker thread and pump the source it returns.
    pub fn spawn_with<F>(open: F, ctx: Option<egui::Context>) -> Self
    where
        F: FnOnce() -> Result<Box<dyn FrameSource>> + Send + 'static,
    {
        let (sender, receiver) = channel();

        std::thread::spawn(move || {
            let source = match open() {
                Ok(source) => source,
                Err(e) => {
                    log::error!("Video open error: {:#}", e);
                    let _ = sender.send(DecodeEvent::Failed(format!("{:#}", e)));
                    wake(ctx.as_ref());
                    return;
                }
            };
            run(source, &sender, ctx.as_ref());
        });

        Self { events: receiver }
    }
}

/// Report the outcome of asking the decoder for hardware acceleration.
/// Returns whether frames will be hardware decoded.
#[cfg_attr(not(feature = "video-opencv"), allow(dead_code))]
fn hw_acceleration_enabled(location: &str, requested: Result<bool>) -> bool {
    match requested {
        Ok(true) => {
            log::info!("Hardware decoding enabled for {}", location);
            true
        }
        Ok(false) => {
            log::warn!("Hardware decoding unavailable for {}, using software decoding", location);
            false
        }
        Err(e) => {
            log::warn!(
                "Hardware decoding request failed for {}, using software decoding: {:#}",
                location,
                e
            );
            false
        }
    }
}

fn wake(ctx: Option<&egui::Context>) {
    if let Some(ctx) = ctx {
        ctx.request_repaint();
    }
}

/// Pump frames from `source` into `sender` until the stream ends, the
/// decoder fails or the receiver goes away.
fn run(mut source: Box<dyn FrameSource>, sender: &Sender<DecodeEvent>, ctx: Option<&egui::Context>) {
    let info = source.info();
    log::info!(
        "Decoding {}x{} @ {:.3} fps ({} frames reported)",
        info.width,
        info.height,
        info.fps,
        info.frame_count
    );
    if sender.send(DecodeEvent::Opened(info)).is_err() {
        return;
    }

    let mut decoded = 0usize;
    let event = loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                decoded += 1;
                if sender.send(DecodeEvent::Frame(frame)).is_err() {
                    log::debug!("Decode cancelled after {} frames", decoded);
                    return;
                }
                wake(ctx);
            }
            Ok(None) => {
                log::info!("Decoding finished, {} frames", decoded);
                break DecodeEvent::Finished;
            }
            Err(e) => {
                log::error!("Decoder error after {} frames: {:#}", decoded, e);
                break DecodeEvent::Failed(format!("{:#}", e));
            }
        }
    };

    let _ = sender.send(event);
    wake(ctx);
}

#[cfg(feature = "video-opencv")]
mod opencv_source {
    use super::{hw_acceleration_enabled, DecodedFrame, FrameSource, StreamInfo};
    use anyhow::{anyhow, Context, Result};
    use opencv::{
        core::{Mat, Size},
        imgproc,
        prelude::*,
        videoio::{
            VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT, CAP_PROP_FRAME_HEIGHT,
            CAP_PROP_FRAME_WIDTH, CAP_PROP_HW_ACCELERATION, VIDEO_ACCELERATION_ANY,
        },
    };

    /// Frames decoded by OpenCV's `VideoCapture` (FFmpeg backend).
    pub struct OpencvSource {
        capture: VideoCapture,
        info: StreamInfo,
        /// Output size when downscaling, `None` to keep the source size
        scaled: Option<Size>,
        next_index: usize,
    }

    impl OpencvSource {
        pub fn open(location: &str, max_width: u32) -> Result<Self> {
            let mut capture = VideoCapture::from_file(location, CAP_ANY)
                .with_context(|| format!("Failed to open video: {}", location))?;
            if !capture.is_opened()? {
                return Err(anyhow!("Failed to open video: {}", location));
            }

            // Prefer the platform decoder (VideoToolbox, VA-API, D3D11, ...)
            let requested = capture
                .set(CAP_PROP_HW_ACCELERATION, VIDEO_ACCELERATION_ANY as f64)
                .map_err(anyhow::Error::from);
            hw_acceleration_enabled(location, requested);

            let fps = capture.get(CAP_PROP_FPS)?;
            let frame_count = capture.get(CAP_PROP_FRAME_COUNT)?.max(0.0) as usize;
            let width = capture.get(CAP_PROP_FRAME_WIDTH)?.max(0.0) as u32;
            let height = capture.get(CAP_PROP_FRAME_HEIGHT)?.max(0.0) as u32;

            let scaled = if max_width > 0 && width > max_width && height > 0 {
                let scaled_height = (height as f64 * max_width as f64 / width as f64).round() as i32;
                Some(Size::new(max_width as i32, scaled_height.max(1)))
            } else {
                None
            };
            let (out_width, out_height) = match scaled {
                Some(size) => (size.width as u32, size.height as u32),
                None => (width, height),
            };

            Ok(Self {
                capture,
                info: StreamInfo {
                    fps,
                    frame_count,
                    width: out_width,
                    height: out_height,
                },
                scaled,
                next_index: 0,
            })
        }
    }

    impl FrameSource for OpencvSource {
        fn info(&self) -> StreamInfo {
            self.info
        }

        fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
            let mut bgr = Mat::default();
            if !self.capture.read(&mut bgr)? || bgr.empty() {
                return Ok(None);
            }

            let bgr = match self.scaled {
                Some(size) => {
                    let mut resized = Mat::default();
                    imgproc::resize(&bgr, &mut resized, size, 0.0, 0.0, imgproc::INTER_AREA)?;
                    resized
                }
                None => bgr,
            };

            let mut rgba = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

            let frame = DecodedFrame {
                index: self.next_index,
                width: rgba.cols() as u32,
                height: rgba.rows() as u32,
                pixels: rgba.data_bytes()?.to_vec(),
            };
            self.next_index += 1;
            Ok(Some(frame))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::time::Duration;

    /// Produces solid frames, optionally failing after a number of frames.
    struct SolidSource {
        remaining: usize,
        fail_after: Option<usize>,
        produced: usize,
    }

    impl FrameSource for SolidSource {
        fn info(&self) -> StreamInfo {
            StreamInfo {
                fps: 30.0,
                frame_count: self.remaining,
                width: 2,
                height: 2,
            }
        }

        fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
            if self.fail_after == Some(self.produced) {
                return Err(anyhow!("corrupt sample"));
            }
            if self.produced == self.remaining {
                return Ok(None);
            }
            let frame = DecodedFrame {
                index: self.produced,
                width: 2,
                height: 2,
                pixels: vec![self.produced as u8; 16],
            };
            self.produced += 1;
            Ok(Some(frame))
        }
    }

    fn collect(worker: DecodeWorker) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = worker.events.recv_timeout(Duration::from_secs(5)) {
            let done = matches!(event, DecodeEvent::Finished | DecodeEvent::Failed(_));
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[test]
    fn test_worker_streams_all_frames_in_order() {
        let worker = DecodeWorker::spawn_with(
            || {
                Ok(Box::new(SolidSource {
                    remaining: 3,
                    fail_after: None,
                    produced: 0,
                }) as Box<dyn FrameSource>)
            },
            None,
        );
        let events = collect(worker);

        assert!(matches!(events.first(), Some(DecodeEvent::Opened(info)) if info.frame_count == 3));
        let indices: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                DecodeEvent::Frame(frame) => Some(frame.index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(matches!(events.last(), Some(DecodeEvent::Finished)));
    }

    #[test]
    fn test_worker_reports_decoder_error() {
        let worker = DecodeWorker::spawn_with(
            || {
                Ok(Box::new(SolidSource {
                    remaining: 10,
                    fail_after: Some(2),
                    produced: 0,
                }) as Box<dyn FrameSource>)
            },
            None,
        );
        let events = collect(worker);

        let frames = events.iter().filter(|e| matches!(e, DecodeEvent::Frame(_))).count();
        assert_eq!(frames, 2);
        assert!(matches!(events.last(), Some(DecodeEvent::Failed(msg)) if msg.contains("corrupt")));
    }

    #[test]
    fn test_hw_acceleration_falls_back_to_software() {
        assert!(hw_acceleration_enabled("/videos/a.mp4", Ok(true)));
        assert!(!hw_acceleration_enabled("/videos/a.mp4", Ok(false)));
        assert!(!hw_acceleration_enabled("/videos/a.mp4", Err(anyhow!("unsupported property"))));
    }

    #[cfg(feature = "video-opencv")]
    #[test]
    fn test_open_missing_video_fails() {
        assert!(opencv_source::OpencvSource::open("/nonexistent/clip.mp4", 0).is_err());
    }

    #[test]
    fn test_worker_reports_open_failure() {
        let worker = DecodeWorker::spawn_with(|| Err(anyhow!("no such file")), None);
        let events = collect(worker);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DecodeEvent::Failed(msg) if msg.contains("no such file")));
    }

    #[cfg(not(feature = "video-opencv"))]
    #[test]
    fn test_open_without_video_support_fails() {
        let err = open_source("/videos/sample.mp4", 0).err().unwrap();
        assert!(err.to_string().contains("video-opencv"));
    }
}
