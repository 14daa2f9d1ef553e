use thiserror::Error;

use crate::AssetSlot;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing {0}: please upload an ID image and take a selfie")]
    MissingAsset(AssetSlot),

    #[error("Image payload is empty")]
    EmptyAsset,

    #[error("Invalid media type '{0}'")]
    InvalidMediaType(String),

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("No live camera stream to capture from")]
    NotStreaming,

    #[error("Frame encoding error: {0}")]
    Encode(String),

    #[error("A verification request is already in flight")]
    SubmissionInFlight,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed verification response: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Failures of the network exchange itself, as opposed to a negative
    /// verdict carried by a well-formed response.
    pub fn is_transport_class(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Timeout(_) | Error::Protocol(_)
        )
    }

    /// Camera permission or hardware failures. The selfie slot is always
    /// back in `Empty` when one of these is returned.
    pub fn is_camera_error(&self) -> bool {
        matches!(self, Error::PermissionDenied | Error::CameraUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Protocol(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
