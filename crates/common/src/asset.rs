//! Binary image payloads exchanged between capture and submission

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The two image slots a verification needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    Id,
    Selfie,
}

impl AssetSlot {
    /// Multipart field name the verification service expects for this slot
    pub fn field_name(&self) -> &'static str {
        match self {
            AssetSlot::Id => "id_image",
            AssetSlot::Selfie => "selfie_image",
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSlot::Id => f.write_str("ID image"),
            AssetSlot::Selfie => f.write_str("selfie"),
        }
    }
}

/// An immutable image payload with a media type and a suggested file name.
///
/// Both acquisition paths (file selection and camera capture) produce this
/// type. A slot replaces its asset wholesale; assets are never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: String,
}

impl ImageAsset {
    /// Create a new asset, rejecting an empty payload
    pub fn new(
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::EmptyAsset);
        }

        let mime_type = mime_type.into();
        if !is_media_type(&mime_type) {
            return Err(Error::InvalidMediaType(mime_type));
        }

        Ok(Self {
            bytes,
            mime_type,
            file_name: file_name.into(),
        })
    }

    /// Read a user-chosen file into an asset.
    ///
    /// The media type comes from the file extension; unknown extensions are
    /// sent as `application/octet-stream` and left for the server to judge.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Self::new(bytes, mime_type_for(path), file_name)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// `type/subtype` with optional `;` parameters, both parts RFC 7230 tokens
fn is_media_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or_default().trim();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };

    let is_token = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
    };

    is_token(kind) && is_token(subtype)
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
