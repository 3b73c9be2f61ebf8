//! Camera capture with guaranteed stream release.
//!
//! A [`CameraDevice`] opens an exclusive [`MediaStream`]. The [`Camera`]
//! controller owns at most one live stream and stops it on dismiss, after a
//! capture attempt (successful or not) and when the controller is dropped.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use tracing::{debug, info, warn};

use crate::error::ScanError;
use crate::scan_image::ScanImage;

/// JPEG quality for captured photos.
pub const CAPTURE_QUALITY: u8 = 90;
pub const CAPTURE_FILENAME: &str = "capture.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera, pointed at the product.
    Environment,
    User,
}

/// One RGB8 video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// A live, exclusive video stream.
pub trait MediaStream: Send {
    fn grab_frame(&mut self) -> anyhow::Result<Frame>;
    /// Stop every track. Must be idempotent.
    fn stop(&mut self);
    fn is_live(&self) -> bool;
}

/// Hardware (or platform) camera access.
#[async_trait::async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, facing: FacingMode) -> anyhow::Result<Box<dyn MediaStream>>;
}

/// Stops the wrapped stream when dropped.
struct ActiveStream(Box<dyn MediaStream>);

impl Drop for ActiveStream {
    fn drop(&mut self) {
        self.0.stop();
        debug!("Camera: stream stopped");
    }
}

pub struct Camera<D: CameraDevice> {
    device: D,
    active: Option<ActiveStream>,
}

impl<D: CameraDevice> Camera<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Open the rear camera. On failure the camera stays inactive.
    pub async fn start(&mut self) -> Result<(), ScanError> {
        // Only one stream at a time.
        self.dismiss();
        match self.device.open(FacingMode::Environment).await {
            Ok(stream) => {
                info!("Camera: stream opened");
                self.active = Some(ActiveStream(stream));
                Ok(())
            }
            Err(e) => {
                warn!("Camera access error: {:#}", e);
                Err(ScanError::CameraAccess {
                    detail: e.to_string(),
                })
            }
        }
    }

    /// Grab the current frame as a JPEG. The stream is stopped whatever the outcome.
    pub fn capture(&mut self) -> Result<ScanImage, ScanError> {
        let mut active = self.active.take().ok_or_else(|| ScanError::CameraAccess {
            detail: "camera is not active".to_string(),
        })?;

        let frame = active.0.grab_frame().map_err(|e| ScanError::CameraAccess {
            detail: format!("failed to grab frame: {:#}", e),
        })?;
        drop(active);

        let jpeg = encode_jpeg(&frame).map_err(|e| ScanError::CameraAccess {
            detail: format!("failed to encode frame: {}", e),
        })?;
        info!(
            "Camera: captured {}x{} frame ({} bytes)",
            frame.width,
            frame.height,
            jpeg.len()
        );
        Ok(ScanImage::from_bytes(CAPTURE_FILENAME, jpeg))
    }

    /// Close the camera view, releasing the stream.
    pub fn dismiss(&mut self) {
        self.active = None;
    }
}

fn encode_jpeg(frame: &Frame) -> image::ImageResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, CAPTURE_QUALITY).encode(
        &frame.rgb,
        frame.width,
        frame.height,
        ColorType::Rgb8,
    )?;
    Ok(out.into_inner())
}
