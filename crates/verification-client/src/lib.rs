//! Verification client
//!
//! Turns two image assets into one `POST {base_url}/validate` exchange and
//! tracks the submission lifecycle:
//!
//! ```text
//! Idle -> Submitting -> Succeeded(VerificationResult) | Failed
//! ```
//!
//! **Components:**
//! - `config`: base URL and timeout, loaded from the environment
//! - `client`: the `VerificationTransport` seam and its reqwest implementation
//! - `tracker`: sequence-numbered submission state; drops stale completions

pub mod client;
pub mod config;
pub mod tracker;

pub use client::{VerificationClient, VerificationTransport, VALIDATE_PATH};
pub use config::ClientConfig;
pub use tracker::{
    Completion, SubmissionOutcome, SubmissionState, SubmissionTicket, SubmissionTracker,
};
