//! HTTP client for the verification service

use async_trait::async_trait;
use philid_common::{AssetSlot, Error, ImageAsset, Result, VerificationResult};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;

/// Path of the validation endpoint, relative to the configured base URL
pub const VALIDATE_PATH: &str = "/validate";

/// One verification exchange: two images in, one verdict out.
///
/// Network failures, timeouts and unparseable bodies are errors. A
/// well-formed response with a negative status is a successful return.
#[async_trait]
pub trait VerificationTransport: Send + Sync {
    async fn verify(&self, id: &ImageAsset, selfie: &ImageAsset) -> Result<VerificationResult>;
}

/// reqwest-backed transport posting a multipart form
pub struct VerificationClient {
    endpoint: String,
    client: reqwest::Client,
}

impl VerificationClient {
    /// Create a new verification client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.validate_endpoint(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(id: &ImageAsset, selfie: &ImageAsset) -> Result<Form> {
        Ok(Form::new()
            .part(AssetSlot::Id.field_name(), part(id)?)
            .part(AssetSlot::Selfie.field_name(), part(selfie)?))
    }
}

#[async_trait]
impl VerificationTransport for VerificationClient {
    async fn verify(&self, id: &ImageAsset, selfie: &ImageAsset) -> Result<VerificationResult> {
        let form = Self::form(id, selfie)?;

        info!(
            "Submitting verification request to {} (id {} bytes, selfie {} bytes)",
            self.endpoint,
            id.len(),
            selfie.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        debug!("Verification response: HTTP {} ({} bytes)", status, body.len());

        if !status.is_success() {
            warn!("Verification service answered HTTP {}", status);
        }

        let result: VerificationResult = serde_json::from_slice(&body)
            .map_err(|e| Error::Protocol(format!("HTTP {}: {}", status, e)))?;

        info!("Verification status: {}", result.status);

        Ok(result)
    }
}

fn part(asset: &ImageAsset) -> Result<Part> {
    Part::bytes(asset.bytes().to_vec())
        .file_name(asset.file_name().to_string())
        .mime_str(asset.mime_type())
        .map_err(|_| Error::InvalidMediaType(asset.mime_type().to_string()))
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else {
        Error::Transport(err.to_string())
    }
}
