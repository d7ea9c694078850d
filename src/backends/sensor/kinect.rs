// SPDX-License-Identifier: GPL-3.0-only

//! Kinect sensor via freedepth
//!
//! freedepth's `KinectStreamer` streams RGB (or IR) video and 11-bit depth
//! over USB directly. A small thread drains both channels and parks the
//! latest converted frame in a shared slot; the update loop picks it up when
//! it polls.
//!
//! Depth is converted to millimeters with the device-calibrated converter, so
//! the mesh depth window is expressed in millimeters too.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use freedepth::{
    DepthFormat, DepthFrame, DepthRegistration, KinectStreamer, Resolution, VideoFormat, VideoFrame,
};
use tracing::{debug, info, warn};

use super::{DepthGrid, DepthSensor, SensorInfo, VideoImage, VideoSource, clamp_tilt};
use crate::errors::SensorError;

/// Enumerate Kinects via freedepth
pub fn enumerate_kinects() -> Vec<SensorInfo> {
    let devices = match freedepth::enumerate_devices() {
        Ok(d) => d,
        Err(e) => {
            debug!("Failed to enumerate depth cameras: {}", e);
            return Vec::new();
        }
    };

    devices
        .iter()
        .map(|dev| {
            info!(name = %dev.name, index = dev.index, "Found depth camera via freedepth");
            SensorInfo {
                name: dev.name.clone(),
                index: dev.index as usize,
                serial: dev.id.serial.clone(),
            }
        })
        .collect()
}

/// Latest frames handed from the streaming thread to the update loop
#[derive(Default)]
struct FrameSlots {
    depth: Mutex<Option<DepthGrid>>,
    video: Mutex<Option<VideoImage>>,
}

impl FrameSlots {
    /// Drop frames left over from a stream that has stopped
    fn clear(&self) {
        if let Ok(mut slot) = self.depth.lock() {
            *slot = None;
        }
        if let Ok(mut slot) = self.video.lock() {
            *slot = None;
        }
    }
}

/// Streaming Kinect sensor
pub struct KinectSensor {
    name: String,
    device_index: usize,
    infrared: bool,
    streamer: Option<KinectStreamer>,
    running: Arc<AtomicBool>,
    slots: Arc<FrameSlots>,
    frame_thread: Option<JoinHandle<()>>,
    depth: Option<DepthGrid>,
    video: Option<VideoImage>,
}

impl KinectSensor {
    /// Open the Kinect at `device_index` and start streaming RGB + depth
    pub fn open(device_index: usize) -> Result<Self, SensorError> {
        let mut sensor = Self {
            name: format!("Kinect #{}", device_index),
            device_index,
            infrared: false,
            streamer: None,
            running: Arc::new(AtomicBool::new(false)),
            slots: Arc::new(FrameSlots::default()),
            frame_thread: None,
            depth: None,
            video: None,
        };
        sensor.start()?;
        Ok(sensor)
    }

    fn start(&mut self) -> Result<(), SensorError> {
        let video_format = if self.infrared {
            VideoFormat::Ir8Bit
        } else {
            VideoFormat::Bayer
        };

        info!(
            device = self.device_index,
            format = ?video_format,
            "Starting depth sensor stream"
        );

        // Unbinds the kernel driver
        let mut streamer = KinectStreamer::new(self.device_index)
            .map_err(|e| SensorError::StartFailed(e.to_string()))?;

        let (video_rx, depth_rx) = streamer
            .start(video_format, Resolution::Medium, DepthFormat::Depth11Bit)
            .map_err(|e| SensorError::StartFailed(e.to_string()))?;

        let registration = streamer.create_depth_registration();
        let depth_converter = Arc::new(registration.depth_to_mm().clone());
        info!(
            target_offset = registration.target_offset(),
            "Fetched depth calibration"
        );

        self.streamer = Some(streamer);
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let slots = Arc::clone(&self.slots);
        self.frame_thread = Some(thread::spawn(move || {
            frame_processing_thread(running, video_rx, depth_rx, slots, depth_converter);
        }));

        Ok(())
    }

    fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            self.slots.clear();
            return;
        }

        info!("Stopping depth sensor stream");
        if let Some(thread) = self.frame_thread.take() {
            let _ = thread.join();
        }

        // Stopping rebinds the kernel driver
        if let Some(mut streamer) = self.streamer.take() {
            streamer.stop();
            if let Err(e) = streamer.rebind_driver() {
                warn!("Failed to rebind kernel driver: {}", e);
            }
        }
        self.slots.clear();
    }
}

impl Drop for KinectSensor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl DepthSensor for KinectSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.streamer.is_some()
    }

    fn poll_depth_frame(&mut self) -> bool {
        let latest = self.slots.depth.lock().ok().and_then(|mut slot| slot.take());
        match latest {
            Some(grid) => {
                self.depth = Some(grid);
                true
            }
            None => false,
        }
    }

    fn depth_grid(&self) -> Option<&DepthGrid> {
        self.depth.as_ref()
    }

    fn poll_video_frame(&mut self) -> bool {
        let latest = self.slots.video.lock().ok().and_then(|mut slot| slot.take());
        match latest {
            Some(image) => {
                self.video = Some(image);
                true
            }
            None => false,
        }
    }

    fn video_image(&self) -> Option<&VideoImage> {
        self.video.as_ref()
    }

    fn set_tilt(&mut self, degrees: i8) -> Result<(), SensorError> {
        let degrees = clamp_tilt(degrees as i32);
        let streamer = self.streamer.as_ref().ok_or(SensorError::MotorUnavailable)?;
        debug!(degrees, "Setting tilt via freedepth");
        streamer
            .set_tilt(degrees)
            .map_err(|e| SensorError::TiltFailed(e.to_string()))
    }

    fn tilt(&self) -> Result<i8, SensorError> {
        let streamer = self.streamer.as_ref().ok_or(SensorError::MotorUnavailable)?;
        streamer
            .get_tilt()
            .map_err(|e| SensorError::TiltFailed(e.to_string()))
    }

    fn set_infrared(&mut self, enabled: bool) -> Result<(), SensorError> {
        if self.infrared == enabled {
            return Ok(());
        }
        // IR shares the video endpoint with Bayer, so the stream restarts
        info!(enabled, "Switching video capture mode");
        let previous = self.infrared;
        self.stop();
        self.video = None;

        self.infrared = enabled;
        let Err(e) = self.start() else {
            return Ok(());
        };

        warn!(error = %e, "Capture mode switch failed, restarting previous mode");
        self.infrared = previous;
        if let Err(restart) = self.start() {
            warn!(error = %restart, "Failed to restart depth sensor stream");
        }
        Err(e)
    }
}

fn frame_processing_thread(
    running: Arc<AtomicBool>,
    video_rx: Receiver<VideoFrame>,
    depth_rx: Receiver<DepthFrame>,
    slots: Arc<FrameSlots>,
    depth_converter: Arc<freedepth::DepthToMm>,
) {
    info!("Frame processing thread started");

    let mut video_count = 0u64;
    let mut depth_count = 0u64;

    while running.load(Ordering::Relaxed) {
        match video_rx.try_recv() {
            Ok(frame) => {
                video_count += 1;
                if let Some(image) = process_video_frame(&frame)
                    && let Ok(mut slot) = slots.video.lock()
                {
                    *slot = Some(image);
                }
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                debug!("Video channel disconnected");
                break;
            }
        }

        match depth_rx.try_recv() {
            Ok(frame) => {
                depth_count += 1;
                if let Some(grid) = process_depth_frame(&frame, &depth_converter)
                    && let Ok(mut slot) = slots.depth.lock()
                {
                    *slot = Some(grid);
                }
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                debug!("Depth channel disconnected");
                break;
            }
        }

        thread::sleep(Duration::from_micros(100));
    }

    info!(
        video_frames = video_count,
        depth_frames = depth_count,
        "Frame processing thread ended"
    );
}

/// Convert a freedepth video frame to RGB
fn process_video_frame(frame: &VideoFrame) -> Option<VideoImage> {
    match frame.format {
        VideoFormat::Rgb | VideoFormat::Bayer => {
            // The hardware only outputs Bayer data; demosaic in software
            let pixels = (frame.width * frame.height) as usize;
            let mut rgb = vec![0u8; pixels * 3];
            freedepth::convert_bayer_to_rgb(&frame.data, &mut rgb, frame.width, frame.height);
            VideoImage::from_rgb(
                VideoSource::Rgb,
                frame.width as u32,
                frame.height as u32,
                rgb,
            )
        }
        VideoFormat::Ir8Bit => {
            VideoImage::from_gray(frame.width as u32, frame.height as u32, &frame.data)
        }
        _ => None,
    }
}

/// Convert raw 11-bit disparity to a millimeter depth grid
fn process_depth_frame(frame: &DepthFrame, converter: &freedepth::DepthToMm) -> Option<DepthGrid> {
    let depth_raw = frame.as_u16()?;

    let mut depth_mm = vec![0u16; depth_raw.len()];
    converter.convert_frame(depth_raw, &mut depth_mm);

    DepthGrid::new(frame.width as usize, frame.height as usize, depth_mm)
}
