//! Capture controller
//!
//! ID slot: `Empty -> Selected`, re-entering `Selected` on every new file.
//!
//! Selfie slot:
//! ```text
//! Empty -> AwaitingPermission -> Streaming -> Captured
//!                  |                 |           |
//!                  +-> Empty <-------+           +-> AwaitingPermission (retake)
//! ```
//!
//! Every exit from `Streaming` releases the camera stream.

use std::path::Path;
use std::sync::Arc;

use philid_common::{Error, ImageAsset, Result};
use tracing::{debug, info, warn};

use crate::camera::{Camera, MediaStream, StreamGuard};
use crate::encoder::FrameEncoder;

/// Observable phase of the selfie slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfiePhase {
    Empty,
    AwaitingPermission,
    Streaming,
    Captured,
}

/// Identifies one permission request.
///
/// Only the ticket of the latest request can move the slot to `Streaming`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionTicket {
    attempt: u64,
}

impl PermissionTicket {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }
}

/// What happened to a permission outcome handed back to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionResolution {
    /// The stream is live and the slot is `Streaming`
    Streaming,
    /// The request had been superseded; any granted stream was stopped
    Stale,
}

enum SelfieSlot {
    Empty,
    AwaitingPermission { attempt: u64 },
    Streaming { guard: StreamGuard },
    Captured(ImageAsset),
}

/// Owns both image slots and the camera stream of one session
pub struct CaptureController {
    camera: Arc<dyn Camera>,
    encoder: FrameEncoder,
    id_asset: Option<ImageAsset>,
    selfie: SelfieSlot,
    attempts: u64,
}

impl CaptureController {
    pub fn new(camera: Arc<dyn Camera>, encoder: FrameEncoder) -> Self {
        Self {
            camera,
            encoder,
            id_asset: None,
            selfie: SelfieSlot::Empty,
            attempts: 0,
        }
    }

    pub fn camera(&self) -> Arc<dyn Camera> {
        Arc::clone(&self.camera)
    }

    /// Store a user-chosen ID image, replacing any earlier selection
    pub fn select_id_image(&mut self, asset: ImageAsset) {
        info!(
            "ID image selected: {} ({}, {} bytes)",
            asset.file_name(),
            asset.mime_type(),
            asset.len()
        );
        self.id_asset = Some(asset);
    }

    /// Read an ID image from disk and select it
    pub async fn select_id_image_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let asset = ImageAsset::from_path(path).await?;
        self.select_id_image(asset);
        Ok(())
    }

    /// Enter `AwaitingPermission`, stopping any stream still open.
    ///
    /// Any previously captured selfie is discarded. Hand the returned ticket
    /// back through `resolve_permission` once the platform answers.
    pub fn start_permission_request(&mut self) -> PermissionTicket {
        self.release_stream();

        self.attempts += 1;
        self.selfie = SelfieSlot::AwaitingPermission {
            attempt: self.attempts,
        };

        debug!("Camera permission requested (attempt {})", self.attempts);
        PermissionTicket {
            attempt: self.attempts,
        }
    }

    /// Apply the platform's answer to a permission request.
    ///
    /// A stale ticket leaves the slot untouched; a stream granted to it is
    /// stopped immediately. For the current ticket a grant moves the slot to
    /// `Streaming` and a failure moves it back to `Empty` and is returned.
    pub fn resolve_permission(
        &mut self,
        ticket: PermissionTicket,
        outcome: Result<Box<dyn MediaStream>>,
    ) -> Result<PermissionResolution> {
        let current = matches!(
            self.selfie,
            SelfieSlot::AwaitingPermission { attempt } if attempt == ticket.attempt
        );

        if !current {
            match outcome {
                Ok(stream) => {
                    warn!(
                        "Late camera grant for superseded attempt {}; stopping stream",
                        ticket.attempt
                    );
                    StreamGuard::new(stream).release();
                }
                Err(e) => {
                    debug!("Ignoring outcome of superseded attempt {}: {}", ticket.attempt, e);
                }
            }
            return Ok(PermissionResolution::Stale);
        }

        match outcome {
            Ok(stream) => {
                info!("Camera streaming (attempt {})", ticket.attempt);
                self.selfie = SelfieSlot::Streaming {
                    guard: StreamGuard::new(stream),
                };
                Ok(PermissionResolution::Streaming)
            }
            Err(e) => {
                warn!("Unable to access camera: {}", e);
                self.selfie = SelfieSlot::Empty;
                Err(e)
            }
        }
    }

    /// Request camera access and wait for the platform's answer
    pub async fn begin_selfie_capture(&mut self) -> Result<PermissionResolution> {
        let ticket = self.start_permission_request();
        let camera = self.camera();
        let outcome = camera.open().await;
        self.resolve_permission(ticket, outcome)
    }

    /// Grab the current frame as the selfie and release the camera.
    ///
    /// Only valid while `Streaming`. The stream is released whether or not
    /// the frame read and encode succeed; on failure the slot is `Empty`.
    pub fn capture_selfie_frame(&mut self) -> Result<&ImageAsset> {
        let mut guard = match std::mem::replace(&mut self.selfie, SelfieSlot::Empty) {
            SelfieSlot::Streaming { guard } => guard,
            other => {
                self.selfie = other;
                return Err(Error::NotStreaming);
            }
        };

        let frame = guard.read_frame();
        guard.release();

        let asset = frame.and_then(|frame| self.encoder.encode(&frame))?;
        info!("Selfie captured ({} bytes)", asset.len());

        Ok(self.selfie_slot_insert(asset))
    }

    /// Leave `AwaitingPermission` or `Streaming` for `Empty`.
    ///
    /// Returns whether there was anything to abort.
    pub fn abort_selfie_capture(&mut self) -> bool {
        match self.selfie {
            SelfieSlot::AwaitingPermission { .. } | SelfieSlot::Streaming { .. } => {
                self.release_stream();
                self.attempts += 1;
                self.selfie = SelfieSlot::Empty;
                info!("Selfie capture aborted");
                true
            }
            _ => false,
        }
    }

    /// Release the camera and invalidate any pending permission request
    pub fn shutdown(&mut self) {
        self.abort_selfie_capture();
    }

    pub fn id_asset(&self) -> Option<&ImageAsset> {
        self.id_asset.as_ref()
    }

    pub fn selfie_asset(&self) -> Option<&ImageAsset> {
        match &self.selfie {
            SelfieSlot::Captured(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn selfie_phase(&self) -> SelfiePhase {
        match self.selfie {
            SelfieSlot::Empty => SelfiePhase::Empty,
            SelfieSlot::AwaitingPermission { .. } => SelfiePhase::AwaitingPermission,
            SelfieSlot::Streaming { .. } => SelfiePhase::Streaming,
            SelfieSlot::Captured(_) => SelfiePhase::Captured,
        }
    }

    /// True while the camera hardware is held
    pub fn camera_active(&self) -> bool {
        matches!(&self.selfie, SelfieSlot::Streaming { guard } if guard.is_active())
    }

    /// Both slots hold an asset
    pub fn is_ready(&self) -> bool {
        self.id_asset.is_some() && self.selfie_asset().is_some()
    }

    fn release_stream(&mut self) {
        if let SelfieSlot::Streaming { guard } = &mut self.selfie {
            guard.release();
        }
    }

    fn selfie_slot_insert(&mut self, asset: ImageAsset) -> &ImageAsset {
        self.selfie = SelfieSlot::Captured(asset);
        match &self.selfie {
            SelfieSlot::Captured(asset) => asset,
            _ => unreachable!("selfie slot was just set to Captured"),
        }
    }
}
