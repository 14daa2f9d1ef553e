//! Verification service response models

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Parsed response from the verification service.
///
/// A negative `status` is still a successful round trip; the client does not
/// interpret the tag beyond displaying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Status tag set by the server (e.g. "Success", "Failed", "approved")
    pub status: String,

    /// Human-readable message; the service omits it on some successes
    #[serde(default)]
    pub message: String,

    /// Extracted identity fields, absent when extraction or matching failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<IdentityData>,
}

/// Identity fields extracted from the ID plus the face-match verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityData {
    pub id_number: String,

    pub first_name: String,

    /// Not every ID carries a middle name
    #[serde(default)]
    pub middle_name: Option<String>,

    pub last_name: String,

    pub dob: String,

    #[serde(deserialize_with = "checked_face_match")]
    pub is_same_person: FaceMatch,

    #[serde(deserialize_with = "checked_similarity")]
    pub similarity: Similarity,
}

impl VerificationResult {
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

/// Face-match flag in the form the service sent it: a JSON boolean or the
/// `"True"`/`"False"` strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceMatch {
    Flag(bool),
    Text(String),
}

impl FaceMatch {
    /// `None` if the text is not a boolean
    pub fn is_match(&self) -> Option<bool> {
        match self {
            FaceMatch::Flag(value) => Some(*value),
            FaceMatch::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
        }
    }
}

impl fmt::Display for FaceMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceMatch::Flag(value) => write!(f, "{}", value),
            FaceMatch::Text(text) => f.write_str(text),
        }
    }
}

/// Similarity score in the form the service sent it: a JSON number or a
/// numeric string, optionally with a trailing `%`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Similarity {
    Score(f64),
    Text(String),
}

impl Similarity {
    /// Numeric value with any `%` suffix removed; the unit is not converted
    pub fn value(&self) -> Option<f64> {
        match self {
            Similarity::Score(value) => Some(*value),
            Similarity::Text(text) => {
                let trimmed = text.trim();
                trimmed.strip_suffix('%').unwrap_or(trimmed).trim().parse().ok()
            }
        }
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, Similarity::Text(text) if text.trim().ends_with('%'))
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Score(value) => write!(f, "{}", value),
            Similarity::Text(text) => f.write_str(text),
        }
    }
}

fn checked_face_match<'de, D>(deserializer: D) -> Result<FaceMatch, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = FaceMatch::deserialize(deserializer)?;
    match flag.is_match() {
        Some(_) => Ok(flag),
        None => Err(serde::de::Error::custom(format!("invalid boolean: {}", flag))),
    }
}

fn checked_similarity<'de, D>(deserializer: D) -> Result<Similarity, D::Error>
where
    D: Deserializer<'de>,
{
    let similarity = Similarity::deserialize(deserializer)?;
    match similarity.value() {
        Some(_) => Ok(similarity),
        None => Err(serde::de::Error::custom(format!(
            "invalid similarity: {}",
            similarity
        ))),
    }
}
