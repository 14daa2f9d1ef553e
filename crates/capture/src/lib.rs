//! Image acquisition for identity verification
//!
//! Owns the two image slots a verification needs:
//! - the ID slot, filled by file selection
//! - the selfie slot, filled by a live camera capture
//!
//! **Components:**
//! - `camera`: platform camera capability (`Camera`, `MediaStream`) and the scoped `StreamGuard`
//! - `encoder`: turns a captured video frame into a PNG `ImageAsset`
//! - `controller`: the per-slot acquisition state machine
//!
//! Whoever holds a `StreamGuard` is responsible for the camera hardware; the
//! guard stops every track exactly once, on release or on drop.

pub mod camera;
pub mod controller;
pub mod encoder;

pub use camera::{Camera, MediaStream, NoCamera, StillCamera, StreamGuard, VideoFrame};
pub use controller::{CaptureController, PermissionResolution, PermissionTicket, SelfiePhase};
pub use encoder::FrameEncoder;
