pub mod asset;
pub mod error;
pub mod result;

pub use asset::{AssetSlot, ImageAsset};
pub use error::{Error, Result};
pub use result::{FaceMatch, IdentityData, Similarity, VerificationResult};
