//! Platform camera capability
//!
//! The capture controller only sees the camera through these traits. A
//! platform backend implements `Camera` (permission prompt + stream
//! acquisition) and `MediaStream` (frame reads + track shutdown).

use std::path::PathBuf;

use async_trait::async_trait;
use image::RgbaImage;
use philid_common::{Error, Result};
use tracing::{debug, info};

/// A single still read from a live video feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    image: RgbaImage,
}

impl VideoFrame {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Build a frame from raw RGBA8 pixels.
    ///
    /// Returns `None` if the buffer length does not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, pixels).map(Self::new)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Camera access as exposed by the platform
#[async_trait]
pub trait Camera: Send + Sync {
    /// Request camera access and start a live stream.
    ///
    /// Suspends until the platform grants or denies permission. Denial is
    /// `Error::PermissionDenied`; missing or failing hardware is
    /// `Error::CameraUnavailable`.
    async fn open(&self) -> Result<Box<dyn MediaStream>>;
}

/// An open camera stream holding the hardware
pub trait MediaStream: Send {
    /// Read the current video frame
    fn read_frame(&mut self) -> Result<VideoFrame>;

    /// Stop every track of the stream, releasing the hardware
    fn stop(&mut self);

    /// Number of media tracks in the stream
    fn track_count(&self) -> usize;
}

/// Scoped ownership of an open `MediaStream`.
///
/// The stream is stopped exactly once: on the first `release()` or, failing
/// that, on drop.
pub struct StreamGuard {
    stream: Option<Box<dyn MediaStream>>,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        debug!("Camera stream acquired ({} tracks)", stream.track_count());
        Self {
            stream: Some(stream),
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    pub fn read_frame(&mut self) -> Result<VideoFrame> {
        match self.stream.as_mut() {
            Some(stream) => stream.read_frame(),
            None => Err(Error::NotStreaming),
        }
    }

    /// Stop all tracks. Later calls are no-ops.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Camera stream released");
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Camera backend serving a fixed frame decoded from an image file.
///
/// Used for headless capture, where the frame was grabbed by another tool.
/// The file is read when the camera is opened, so a missing or undecodable
/// file surfaces as a camera error on the normal capture path.
pub struct StillCamera {
    path: PathBuf,
}

impl StillCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Camera for StillCamera {
    async fn open(&self) -> Result<Box<dyn MediaStream>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::CameraUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let image = image::load_from_memory(&bytes)
            .map_err(|e| Error::CameraUnavailable(format!("{}: {}", self.path.display(), e)))?
            .to_rgba8();

        info!(
            "Still camera opened: {} ({}x{})",
            self.path.display(),
            image.width(),
            image.height()
        );

        Ok(Box::new(StillStream {
            frame: VideoFrame::new(image),
            live: true,
        }))
    }
}

struct StillStream {
    frame: VideoFrame,
    live: bool,
}

impl MediaStream for StillStream {
    fn read_frame(&mut self) -> Result<VideoFrame> {
        if !self.live {
            return Err(Error::NotStreaming);
        }
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        self.live = false;
    }

    fn track_count(&self) -> usize {
        1
    }
}

/// Camera backend for machines without any capture device
pub struct NoCamera;

#[async_trait]
impl Camera for NoCamera {
    async fn open(&self) -> Result<Box<dyn MediaStream>> {
        Err(Error::CameraUnavailable("no camera device found".to_string()))
    }
}
