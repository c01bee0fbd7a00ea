use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::Record;
use crate::errors::ClientError;
use crate::models::{require, require_if_set, RecordId, Validate};

// ────────────────────────────────────────────────────────────────────────────
// Work experience
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: RecordId,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceDraft {
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<String>,
}

/// Partial update. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperiencePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Vec<String>>,
}

impl ExperienceDraft {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            ..Default::default()
        }
    }
}

impl Validate for ExperienceDraft {
    fn validate(&self) -> Result<(), ClientError> {
        require("title", &self.title)?;
        require("company", &self.company)?;
        check_date_order(self.start_date, self.end_date)?;
        // Blank bullet lines are dropped by the form, never sent.
        if self.achievements.iter().any(|a| a.trim().is_empty()) {
            return Err(ClientError::Validation(
                "achievements must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }
}

impl Validate for ExperiencePatch {
    fn validate(&self) -> Result<(), ClientError> {
        require_if_set("title", self.title.as_deref())?;
        require_if_set("company", self.company.as_deref())?;
        check_date_order(self.start_date, self.end_date)
    }
}

impl Record for Experience {
    type Draft = ExperienceDraft;
    type Patch = ExperiencePatch;
    const ENDPOINT: &'static str = "/profile/experiences";
    const NOUN: &'static str = "experience";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: RecordId,
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationDraft {
    pub institution: String,
    pub degree: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl Validate for EducationDraft {
    fn validate(&self) -> Result<(), ClientError> {
        require("institution", &self.institution)?;
        require("degree", &self.degree)?;
        check_date_order(self.start_date, self.end_date)
    }
}

impl Validate for EducationPatch {
    fn validate(&self) -> Result<(), ClientError> {
        require_if_set("institution", self.institution.as_deref())?;
        require_if_set("degree", self.degree.as_deref())?;
        check_date_order(self.start_date, self.end_date)
    }
}

impl Record for Education {
    type Draft = EducationDraft;
    type Patch = EducationPatch;
    const ENDPOINT: &'static str = "/profile/educations";
    const NOUN: &'static str = "education";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Achievements
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Validate for AchievementDraft {
    fn validate(&self) -> Result<(), ClientError> {
        require("title", &self.title)
    }
}

impl Validate for AchievementPatch {
    fn validate(&self) -> Result<(), ClientError> {
        require_if_set("title", self.title.as_deref())
    }
}

impl Record for Achievement {
    type Draft = AchievementDraft;
    type Patch = AchievementPatch;
    const ENDPOINT: &'static str = "/profile/achievements";
    const NOUN: &'static str = "achievement";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ClientError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ClientError::Validation(format!(
                "end_date {end} is before start_date {start}"
            )));
        }
    }
    Ok(())
}
