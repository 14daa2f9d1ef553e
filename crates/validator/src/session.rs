//! One verification session
//!
//! `Session` owns every piece of mutable state a front end needs: both image
//! slots and the camera stream (through the `CaptureController`), the
//! submission lifecycle (through the `SubmissionTracker`) and the last
//! user-facing notice. Front ends read it through `view()`.

use std::path::Path;
use std::sync::Arc;

use philid_capture::{CaptureController, MediaStream, PermissionResolution, PermissionTicket, SelfiePhase};
use philid_client::{Completion, SubmissionOutcome, SubmissionTicket, SubmissionTracker, VerificationTransport};
use philid_common::{AssetSlot, Error, ImageAsset, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Snapshot of everything a front end renders
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub id_selected: bool,
    pub selfie_phase: SelfiePhase,
    /// Both assets are present and nothing is in flight
    pub submit_enabled: bool,
    pub submitting: bool,
    /// Last outcome; never set while a submission is in flight
    pub outcome: Option<SubmissionOutcome>,
    /// Camera or capture problem to show the user
    pub notice: Option<String>,
}

/// A submission that has been started but not yet sent.
///
/// Holds its own copies of both assets, so the exchange runs without
/// borrowing the session.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    ticket: SubmissionTicket,
    id: ImageAsset,
    selfie: ImageAsset,
}

impl PendingSubmission {
    pub fn ticket(&self) -> SubmissionTicket {
        self.ticket
    }

    /// Perform the network exchange
    pub async fn send(&self, transport: &dyn VerificationTransport) -> SubmissionOutcome {
        SubmissionOutcome::from_result(transport.verify(&self.id, &self.selfie).await)
    }
}

pub struct Session {
    id: Uuid,
    capture: CaptureController,
    tracker: SubmissionTracker,
    transport: Arc<dyn VerificationTransport>,
    notice: Option<String>,
}

impl Session {
    pub fn new(capture: CaptureController, transport: Arc<dyn VerificationTransport>) -> Self {
        let id = Uuid::new_v4();
        info!("Session {} started", id);

        Self {
            id,
            capture,
            tracker: SubmissionTracker::new(),
            transport,
            notice: None,
        }
    }

    pub fn capture(&self) -> &CaptureController {
        &self.capture
    }

    pub fn select_id_image(&mut self, asset: ImageAsset) {
        self.capture.select_id_image(asset);
        self.tracker.invalidate();
    }

    pub async fn select_id_image_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.capture.select_id_image_path(path).await?;
        self.tracker.invalidate();
        Ok(())
    }

    /// Start a new selfie attempt; any earlier selfie and result are dropped
    pub fn start_permission_request(&mut self) -> PermissionTicket {
        self.notice = None;
        self.tracker.invalidate();
        self.capture.start_permission_request()
    }

    pub fn resolve_permission(
        &mut self,
        ticket: PermissionTicket,
        outcome: Result<Box<dyn MediaStream>>,
    ) -> Result<PermissionResolution> {
        self.capture
            .resolve_permission(ticket, outcome)
            .inspect_err(|e| self.notice = Some(camera_notice(e)))
    }

    pub async fn begin_selfie_capture(&mut self) -> Result<PermissionResolution> {
        let ticket = self.start_permission_request();
        let camera = self.capture.camera();
        let outcome = camera.open().await;
        self.resolve_permission(ticket, outcome)
    }

    pub fn capture_selfie_frame(&mut self) -> Result<()> {
        match self.capture.capture_selfie_frame() {
            Ok(_) => {
                self.notice = None;
                self.tracker.invalidate();
                Ok(())
            }
            Err(Error::NotStreaming) => Err(Error::NotStreaming),
            Err(e) => {
                self.notice = Some(camera_notice(&e));
                Err(e)
            }
        }
    }

    pub fn abort_selfie_capture(&mut self) -> bool {
        self.capture.abort_selfie_capture()
    }

    /// Validate inputs and start a submission.
    ///
    /// Returns `Ok(None)` without side effects when a submission is already in
    /// flight. A missing asset is an input error and nothing is started.
    pub fn begin_submission(&mut self) -> Result<Option<PendingSubmission>> {
        if self.tracker.is_in_flight() {
            debug!("Session {}: submit ignored, request in flight", self.id);
            return Ok(None);
        }

        let id = self
            .capture
            .id_asset()
            .cloned()
            .ok_or(Error::MissingAsset(AssetSlot::Id))?;
        let selfie = self
            .capture
            .selfie_asset()
            .cloned()
            .ok_or(Error::MissingAsset(AssetSlot::Selfie))?;

        let ticket = self.tracker.begin()?;
        info!("Session {}: submission {} started", self.id, ticket.seq());

        Ok(Some(PendingSubmission { ticket, id, selfie }))
    }

    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: SubmissionOutcome,
    ) -> Completion {
        let completion = self.tracker.complete(ticket, outcome);
        if completion == Completion::Discarded {
            warn!(
                "Session {}: response for submission {} dropped",
                self.id,
                ticket.seq()
            );
        }
        completion
    }

    /// Validate, send and record one submission.
    ///
    /// `Ok(None)` means a submission was already in flight and nothing was
    /// sent.
    pub async fn submit(&mut self) -> Result<Option<Completion>> {
        let Some(pending) = self.begin_submission()? else {
            return Ok(None);
        };

        let transport = Arc::clone(&self.transport);
        let outcome = pending.send(transport.as_ref()).await;

        Ok(Some(self.finish_submission(pending.ticket(), outcome)))
    }

    pub fn view(&self) -> SessionView {
        let submitting = self.tracker.is_in_flight();

        SessionView {
            id_selected: self.capture.id_asset().is_some(),
            selfie_phase: self.capture.selfie_phase(),
            submit_enabled: self.capture.is_ready() && !submitting,
            submitting,
            outcome: self.tracker.outcome().cloned(),
            notice: self.notice.clone(),
        }
    }

    /// Release the camera; the session stays usable
    pub fn shutdown(&mut self) {
        self.capture.shutdown();
        info!("Session {} shut down", self.id);
    }
}

fn camera_notice(err: &Error) -> String {
    if err.is_camera_error() {
        format!("Unable to access camera. Please check permissions. ({})", err)
    } else {
        err.to_string()
    }
}
