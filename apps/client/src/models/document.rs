use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::collection::Record;
use crate::errors::ClientError;
use crate::models::{require, require_if_set, RecordId, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Cv,
    CoverLetter,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Cv => "cv",
            DocumentType::CoverLetter => "cover_letter",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cv" | "resume" => Ok(DocumentType::Cv),
            "cover_letter" => Ok(DocumentType::CoverLetter),
            other => Err(ClientError::Validation(format!(
                "unknown document type '{other}' (expected 'cv' or 'cover_letter')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    pub title: String,
    pub document_type: DocumentType,
    #[serde(default)]
    pub employer_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Raw document content written by the user rather than generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub title: String,
    pub document_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

impl Validate for DocumentDraft {
    fn validate(&self) -> Result<(), ClientError> {
        require("title", &self.title)?;
        require("content", &self.content)
    }
}

impl Validate for DocumentPatch {
    fn validate(&self) -> Result<(), ClientError> {
        require_if_set("title", self.title.as_deref())
    }
}

impl Record for Document {
    type Draft = DocumentDraft;
    type Patch = DocumentPatch;
    const ENDPOINT: &'static str = "/documents";
    const NOUN: &'static str = "document";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation request
// ────────────────────────────────────────────────────────────────────────────

/// Which profile records the generator may draw on.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProfileSelection {
    #[default]
    All,
    Selected {
        experience_ids: Vec<RecordId>,
        education_ids: Vec<RecordId>,
        achievement_ids: Vec<RecordId>,
    },
}

/// Asks the backend to compose a document. The server computes the content.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub document_type: DocumentType,
    pub title: String,
    pub employer_name: String,
    pub job_title: String,
    pub job_description: String,
    pub selection: ProfileSelection,
}

/// Wire shape: `use_all_experiences` plus the id lists only for explicit selections.
#[derive(Serialize)]
struct GenerationPayload<'a> {
    document_type: DocumentType,
    title: &'a str,
    employer_name: &'a str,
    job_title: &'a str,
    job_description: &'a str,
    use_all_experiences: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    experience_ids: Option<&'a [RecordId]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    education_ids: Option<&'a [RecordId]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    achievement_ids: Option<&'a [RecordId]>,
}

impl Serialize for GenerationRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (use_all, experiences, educations, achievements) = match &self.selection {
            ProfileSelection::All => (true, None, None, None),
            ProfileSelection::Selected {
                experience_ids,
                education_ids,
                achievement_ids,
            } => (
                false,
                Some(experience_ids.as_slice()),
                Some(education_ids.as_slice()),
                Some(achievement_ids.as_slice()),
            ),
        };

        GenerationPayload {
            document_type: self.document_type,
            title: &self.title,
            employer_name: &self.employer_name,
            job_title: &self.job_title,
            job_description: &self.job_description,
            use_all_experiences: use_all,
            experience_ids: experiences,
            education_ids: educations,
            achievement_ids: achievements,
        }
        .serialize(serializer)
    }
}

impl Validate for GenerationRequest {
    fn validate(&self) -> Result<(), ClientError> {
        if self.title.trim().is_empty() {
            return Err(ClientError::Validation(
                "Please provide a title for your document".to_string(),
            ));
        }
        if let ProfileSelection::Selected {
            experience_ids,
            education_ids,
            achievement_ids,
        } = &self.selection
        {
            if experience_ids.is_empty() && education_ids.is_empty() && achievement_ids.is_empty() {
                return Err(ClientError::Validation(
                    "Select at least one profile item or use all experiences".to_string(),
                ));
            }
        }
        Ok(())
    }
}
