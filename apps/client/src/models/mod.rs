pub mod document;
pub mod employer;
pub mod profile;
pub mod user;

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::errors::ClientError;

pub use document::{Document, DocumentDraft, DocumentPatch, DocumentType, GenerationRequest, ProfileSelection};
pub use employer::EmployerProfile;
pub use profile::{
    Achievement, AchievementDraft, AchievementPatch, Education, EducationDraft, EducationPatch,
    Experience, ExperienceDraft, ExperiencePatch,
};
pub use user::{Credentials, Registration, User, UserPatch};

/// Stable identifier of a backend record.
///
/// The backend hands out ids either as JSON strings or integers; both are
/// normalised to their string form so records compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(text) if text.trim().is_empty() => {
                Err(de::Error::custom("record id must not be empty"))
            }
            RawId::Text(text) => Ok(RecordId(text)),
            RawId::Number(n) => Ok(RecordId(n.to_string())),
        }
    }
}

/// Client-side checks run before a payload is dispatched.
pub trait Validate {
    fn validate(&self) -> Result<(), ClientError>;
}

/// Fails with a validation error naming `field` when `value` is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Like [`require`], but only for fields that are present.
pub(crate) fn require_if_set(field: &str, value: Option<&str>) -> Result<(), ClientError> {
    match value {
        Some(v) => require(field, v),
        None => Ok(()),
    }
}
