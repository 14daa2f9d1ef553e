//! Submission lifecycle
//!
//! Every submission gets a ticket with a fresh sequence number. A completion
//! only lands if its ticket is the latest one and has not been invalidated by
//! a newer capture; anything else is dropped.

use chrono::{DateTime, Utc};
use philid_common::{Error, Result, VerificationResult};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Handle for one in-flight submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    seq: u64,
}

impl SubmissionTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Terminal outcome of one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Round trip completed; the verdict itself may still be negative
    Succeeded {
        result: VerificationResult,
        completed_at: DateTime<Utc>,
    },
    /// Network, timeout or protocol failure; no result is available
    Failed {
        reason: String,
        completed_at: DateTime<Utc>,
    },
}

impl SubmissionOutcome {
    pub fn from_result(result: Result<VerificationResult>) -> Self {
        let completed_at = Utc::now();
        match result {
            Ok(result) => SubmissionOutcome::Succeeded {
                result,
                completed_at,
            },
            Err(e) => SubmissionOutcome::Failed {
                reason: e.to_string(),
                completed_at,
            },
        }
    }

    pub fn result(&self) -> Option<&VerificationResult> {
        match self {
            SubmissionOutcome::Succeeded { result, .. } => Some(result),
            SubmissionOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SubmissionOutcome::Failed { .. })
    }
}

/// Coarse state for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Whether a completion was applied or dropped as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
}

#[derive(Debug, Default)]
pub struct SubmissionTracker {
    latest: u64,
    in_flight: Option<u64>,
    stale_through: u64,
    outcome: Option<SubmissionOutcome>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a submission.
    ///
    /// Clears the previous outcome before returning, so nothing old is
    /// visible once the request goes out. Fails with
    /// `Error::SubmissionInFlight` while another submission is pending.
    pub fn begin(&mut self) -> Result<SubmissionTicket> {
        if let Some(seq) = self.in_flight {
            debug!("Submission {} still in flight", seq);
            return Err(Error::SubmissionInFlight);
        }

        self.latest += 1;
        self.in_flight = Some(self.latest);
        self.outcome = None;

        info!("Submission {} started", self.latest);
        Ok(SubmissionTicket { seq: self.latest })
    }

    /// Hand back the outcome of a submission.
    ///
    /// Completing the in-flight ticket always re-enables submission, even
    /// when the outcome itself is dropped as stale.
    pub fn complete(&mut self, ticket: SubmissionTicket, outcome: SubmissionOutcome) -> Completion {
        if self.in_flight == Some(ticket.seq) {
            self.in_flight = None;
        }

        if ticket.seq != self.latest || ticket.seq <= self.stale_through {
            warn!("Discarding stale response for submission {}", ticket.seq);
            return Completion::Discarded;
        }

        if self.outcome.is_some() {
            warn!("Submission {} already completed", ticket.seq);
            return Completion::Discarded;
        }

        match &outcome {
            SubmissionOutcome::Succeeded { result, .. } => {
                info!("Submission {} succeeded: {}", ticket.seq, result.status)
            }
            SubmissionOutcome::Failed { reason, .. } => {
                warn!("Submission {} failed: {}", ticket.seq, reason)
            }
        }

        self.outcome = Some(outcome);
        Completion::Applied
    }

    /// Drop the current outcome and mark any in-flight submission stale
    pub fn invalidate(&mut self) {
        self.stale_through = self.latest;
        if self.outcome.take().is_some() {
            debug!("Previous verification result cleared");
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Last applied outcome; always `None` while a submission is in flight
    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        if self.is_in_flight() {
            return None;
        }
        self.outcome.as_ref()
    }

    pub fn state(&self) -> SubmissionState {
        if self.is_in_flight() {
            return SubmissionState::Submitting;
        }
        match &self.outcome {
            None => SubmissionState::Idle,
            Some(SubmissionOutcome::Succeeded { .. }) => SubmissionState::Succeeded,
            Some(SubmissionOutcome::Failed { .. }) => SubmissionState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(status: &str) -> SubmissionOutcome {
        SubmissionOutcome::from_result(Ok(VerificationResult {
            status: status.to_string(),
            message: String::new(),
            data: None,
        }))
    }

    fn failure() -> SubmissionOutcome {
        SubmissionOutcome::from_result(Err(Error::Timeout("30s elapsed".to_string())))
    }

    #[test]
    fn test_begin_clears_previous_outcome() {
        let mut tracker = SubmissionTracker::new();
        let ticket = tracker.begin().unwrap();
        tracker.complete(ticket, verdict("Success"));
        assert_eq!(tracker.state(), SubmissionState::Succeeded);

        tracker.begin().unwrap();
        assert_eq!(tracker.state(), SubmissionState::Submitting);
        assert!(tracker.outcome().is_none());
    }

    #[test]
    fn test_second_begin_while_in_flight() {
        let mut tracker = SubmissionTracker::new();
        let first = tracker.begin().unwrap();

        assert!(matches!(tracker.begin(), Err(Error::SubmissionInFlight)));

        assert_eq!(tracker.complete(first, verdict("Success")), Completion::Applied);
        assert!(tracker.begin().is_ok());
    }

    #[test]
    fn test_failure_reenables_submission() {
        let mut tracker = SubmissionTracker::new();
        let ticket = tracker.begin().unwrap();

        assert_eq!(tracker.complete(ticket, failure()), Completion::Applied);
        assert_eq!(tracker.state(), SubmissionState::Failed);
        assert!(!tracker.is_in_flight());
        assert!(tracker.outcome().unwrap().result().is_none());
    }

    #[test]
    fn test_invalidated_response_discarded() {
        let mut tracker = SubmissionTracker::new();
        let a = tracker.begin().unwrap();

        tracker.invalidate();
        assert_eq!(tracker.complete(a, verdict("Success")), Completion::Discarded);
        assert_eq!(tracker.state(), SubmissionState::Idle);

        // A's completion still freed the slot for B
        let b = tracker.begin().unwrap();
        assert_eq!(tracker.complete(b, verdict("Failed")), Completion::Applied);
        assert_eq!(tracker.outcome().unwrap().result().unwrap().status, "Failed");
    }

    #[test]
    fn test_old_ticket_cannot_overwrite_newer_result() {
        let mut tracker = SubmissionTracker::new();
        let a = tracker.begin().unwrap();
        tracker.complete(a, verdict("A"));
        let b = tracker.begin().unwrap();
        tracker.complete(b, verdict("B"));

        assert_eq!(tracker.complete(a, verdict("late A")), Completion::Discarded);
        assert_eq!(tracker.outcome().unwrap().result().unwrap().status, "B");
    }

    #[test]
    fn test_old_ticket_does_not_clear_in_flight() {
        let mut tracker = SubmissionTracker::new();
        let a = tracker.begin().unwrap();
        tracker.complete(a, verdict("A"));
        let _b = tracker.begin().unwrap();

        assert_eq!(tracker.complete(a, verdict("late A")), Completion::Discarded);
        assert!(tracker.is_in_flight());
        assert!(tracker.outcome().is_none());
    }

    #[test]
    fn test_duplicate_completion_discarded() {
        let mut tracker = SubmissionTracker::new();
        let a = tracker.begin().unwrap();
        tracker.complete(a, verdict("first"));

        assert_eq!(tracker.complete(a, verdict("second")), Completion::Discarded);
        assert_eq!(tracker.outcome().unwrap().result().unwrap().status, "first");
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(verdict("approved")).unwrap();
        assert_eq!(json["outcome"], "succeeded");
        assert_eq!(json["result"]["status"], "approved");

        let json = serde_json::to_value(failure()).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert!(json["reason"].as_str().unwrap().contains("timed out"));
    }
}
