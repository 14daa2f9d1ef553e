//! Frame encoder
//!
//! Converts a live video frame into an `ImageAsset` shaped like a file
//! upload, so the verification client never needs to know which acquisition
//! path produced a selfie.

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder};
use philid_common::{Error, ImageAsset, Result};
use tracing::debug;

use crate::camera::VideoFrame;

/// Output width used when none is configured
pub const DEFAULT_TARGET_WIDTH: u32 = 300;

/// File name given to every encoded selfie
pub const SELFIE_FILE_NAME: &str = "selfie.png";

/// Media type of every encoded selfie
pub const SELFIE_MIME_TYPE: &str = "image/png";

/// Largest output width or height the encoder will produce
pub const MAX_DIMENSION: u32 = 4096;

/// Scales a frame to a fixed width and encodes it as PNG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEncoder {
    target_width: u32,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_WIDTH)
    }
}

impl FrameEncoder {
    pub fn new(target_width: u32) -> Self {
        Self { target_width }
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    /// Height that preserves the frame's aspect ratio at the target width
    pub fn scaled_height(&self, frame_width: u32, frame_height: u32) -> u32 {
        let height = frame_height as f64 * self.target_width as f64 / frame_width as f64;
        (height.round() as u32).max(1)
    }

    /// Encode a frame into a PNG asset.
    ///
    /// Deterministic: the same frame at the same target width always yields
    /// the same bytes.
    pub fn encode(&self, frame: &VideoFrame) -> Result<ImageAsset> {
        if self.target_width == 0 {
            return Err(Error::Encode("target width must be greater than 0".to_string()));
        }
        if frame.width() == 0 || frame.height() == 0 {
            return Err(Error::Encode(format!(
                "empty frame ({}x{})",
                frame.width(),
                frame.height()
            )));
        }

        let width = self.target_width;
        let height = self.scaled_height(frame.width(), frame.height());
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Error::Encode(format!(
                "output {}x{} exceeds {}x{}",
                width, height, MAX_DIMENSION, MAX_DIMENSION
            )));
        }
        let raster = imageops::resize(frame.image(), width, height, FilterType::Triangle);

        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| Error::Encode(e.to_string()))?;

        debug!(
            "Encoded {}x{} frame to {}x{} PNG ({} bytes)",
            frame.width(),
            frame.height(),
            width,
            height,
            bytes.len()
        );

        ImageAsset::new(bytes, SELFIE_MIME_TYPE, SELFIE_FILE_NAME)
    }
}
