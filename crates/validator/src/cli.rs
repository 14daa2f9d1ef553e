//! Command-line surface of `philid-validator`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use philid_capture::{Camera, CaptureController, FrameEncoder, NoCamera, StillCamera};
use philid_client::VerificationClient;
use tracing::info;

use crate::config::{SelfieArgs, ServiceArgs, ValidatorConfig};
use crate::render::{render, OutputFormat};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "philid-validator", version, about = "Verify your identity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit an ID photo and a selfie to the verification service
    Verify(VerifyArgs),
    /// Encode a camera frame into the selfie asset without submitting it
    Encode(EncodeArgs),
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Photo of the national ID
    #[arg(long, value_name = "PATH")]
    pub id: PathBuf,
    /// Still frame served as the camera feed; without it no camera is available
    #[arg(long, value_name = "PATH")]
    pub frame: Option<PathBuf>,
    #[command(flatten)]
    pub service: ServiceArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Still frame to encode
    #[arg(long, value_name = "PATH")]
    pub frame: PathBuf,
    /// Where to write the encoded selfie
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
    #[command(flatten)]
    pub selfie: SelfieArgs,
}

impl Cli {
    /// Run the selected command.
    ///
    /// Returns `Ok(false)` when the verification exchange itself failed; a
    /// negative verdict from the server is `Ok(true)`.
    pub async fn run(self) -> Result<bool> {
        match self.command {
            Command::Verify(args) => run_verify(args).await,
            Command::Encode(args) => run_encode(args).await.map(|_| true),
        }
    }
}

async fn run_verify(args: VerifyArgs) -> Result<bool> {
    let config = ValidatorConfig::from_args(&args.service)?;

    let camera: Arc<dyn Camera> = match &args.frame {
        Some(path) => Arc::new(StillCamera::new(path)),
        None => Arc::new(NoCamera),
    };
    let client = VerificationClient::new(&config.client)?;
    info!("Verification endpoint: {}", client.endpoint());

    let capture = CaptureController::new(camera, FrameEncoder::new(config.selfie_width));
    let mut session = Session::new(capture, Arc::new(client));

    session
        .select_id_image_path(&args.id)
        .await
        .with_context(|| format!("Failed to read ID image {}", args.id.display()))?;

    if let Err(e) = session.begin_selfie_capture().await {
        let notice = session.view().notice.unwrap_or_else(|| e.to_string());
        anyhow::bail!(notice);
    }
    session
        .capture_selfie_frame()
        .context("Failed to capture selfie")?;

    session.submit().await?;

    let outcome = session
        .view()
        .outcome
        .context("Verification finished without an outcome")?;
    print!("{}", render(&outcome, args.format)?);

    Ok(!outcome.is_failure())
}

async fn run_encode(args: EncodeArgs) -> Result<()> {
    let mut capture = CaptureController::new(
        Arc::new(StillCamera::new(&args.frame)),
        FrameEncoder::new(args.selfie.selfie_width),
    );
    capture.begin_selfie_capture().await?;
    let asset = capture.capture_selfie_frame()?;

    tokio::fs::write(&args.output, asset.bytes())
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        "Wrote {} ({}, {} bytes)",
        args.output.display(),
        asset.mime_type(),
        asset.len()
    );

    Ok(())
}
