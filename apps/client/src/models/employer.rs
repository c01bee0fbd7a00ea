use serde::{Deserialize, Serialize};

use crate::models::RecordId;

/// Employer details, either looked up or scraped from the employer's website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerProfile {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScrapeRequest<'a> {
    pub employer_url: &'a str,
}
