//! Configuration management for the validator front end
//!
//! Every setting is a command-line flag with an environment fallback. `main`
//! loads `.env` before the command line is parsed, so values from the file
//! count as environment values.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use philid_capture::encoder::{DEFAULT_TARGET_WIDTH, MAX_DIMENSION};
use philid_client::config::DEFAULT_TIMEOUT_SECS;
use philid_client::ClientConfig;

/// Settings for talking to the verification service
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Base URL of the verification service
    #[arg(long, env = "PHILID_API_URL", value_name = "URL")]
    pub api_url: String,

    /// Whole-request timeout in seconds
    #[arg(
        long = "timeout",
        env = "PHILID_REQUEST_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,

    #[command(flatten)]
    pub selfie: SelfieArgs,
}

/// Settings for the selfie encoder
#[derive(Args, Debug, Clone)]
pub struct SelfieArgs {
    /// Width in pixels of the encoded selfie
    #[arg(
        long,
        env = "PHILID_SELFIE_WIDTH",
        value_name = "PIXELS",
        default_value_t = DEFAULT_TARGET_WIDTH,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DIMENSION))
    )]
    pub selfie_width: u32,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Verification service settings
    pub client: ClientConfig,

    /// Width in pixels of encoded selfies
    pub selfie_width: u32,
}

impl ValidatorConfig {
    /// Build the configuration from parsed flags and their environment fallbacks
    pub fn from_args(args: &ServiceArgs) -> Result<Self> {
        let client = ClientConfig::new(
            &args.api_url,
            Duration::from_secs(args.request_timeout_secs),
        )?;

        Ok(Self {
            client,
            selfie_width: args.selfie.selfie_width,
        })
    }
}
