//! PhilID Validator
//!
//! Terminal front end for identity verification: select a photo of a
//! national ID, capture a selfie, submit both to the verification service and
//! print the verdict.
//!
//! **Components:**
//! - `session`: the single state owner for one user session
//! - `render`: table and JSON output of a submission outcome
//! - `config`: environment configuration
//! - `cli`: command-line surface of the `philid-validator` binary

pub mod cli;
pub mod config;
pub mod render;
pub mod session;

pub use config::ValidatorConfig;
pub use session::{PendingSubmission, Session, SessionView};
