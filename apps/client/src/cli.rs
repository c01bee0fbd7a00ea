use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use resume_client::models::{
    AchievementDraft, AchievementPatch, DocumentDraft, DocumentPatch, DocumentType,
    EducationDraft, EducationPatch, ExperienceDraft, ExperiencePatch, GenerationRequest,
    ProfileSelection, RecordId,
};

#[derive(Debug, Parser)]
#[command(name = "resume-client", version, about = "Command-line client for the résumé service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the backend is up
    Health,
    /// Log in and persist the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "RESUME_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RESUME_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// End the session and forget the stored credential
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Work experiences
    #[command(subcommand)]
    Experiences(ExperienceCommand),
    /// Education history
    #[command(subcommand)]
    Educations(EducationCommand),
    /// Achievements
    #[command(subcommand)]
    Achievements(AchievementCommand),
    /// Generated documents
    #[command(subcommand)]
    Documents(DocumentCommand),
    /// Employer lookups
    #[command(subcommand)]
    Employer(EmployerCommand),
}

#[derive(Debug, Subcommand)]
pub enum ExperienceCommand {
    List,
    Add(ExperienceArgs),
    Update {
        id: String,
        #[command(flatten)]
        fields: ExperiencePatchArgs,
    },
    Remove {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ExperienceArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long)]
    pub description: Option<String>,
    /// Repeat for each bullet
    #[arg(long = "achievement")]
    pub achievements: Vec<String>,
}

/// Only the flags given are sent.
#[derive(Debug, Args)]
pub struct ExperiencePatchArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long)]
    pub description: Option<String>,
    /// Replaces every bullet; repeat for each one
    #[arg(long = "achievement")]
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Subcommand)]
pub enum EducationCommand {
    List,
    Add(EducationArgs),
    Update {
        id: String,
        #[command(flatten)]
        fields: EducationPatchArgs,
    },
    Remove {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct EducationArgs {
    #[arg(long)]
    pub institution: String,
    #[arg(long)]
    pub degree: String,
    #[arg(long)]
    pub field_of_study: Option<String>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long)]
    pub grade: Option<String>,
}

#[derive(Debug, Args)]
pub struct EducationPatchArgs {
    #[arg(long)]
    pub institution: Option<String>,
    #[arg(long)]
    pub degree: Option<String>,
    #[arg(long)]
    pub field_of_study: Option<String>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long)]
    pub grade: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum AchievementCommand {
    List,
    Add(AchievementArgs),
    Update {
        id: String,
        #[command(flatten)]
        fields: AchievementPatchArgs,
    },
    Remove {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct AchievementArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct AchievementPatchArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    List,
    Show {
        id: String,
    },
    /// Store a document written by hand
    Create(DocumentArgs),
    Generate(GenerateArgs),
    Update {
        id: String,
        #[command(flatten)]
        fields: DocumentPatchArgs,
    },
    Remove {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// `cv` or `cover_letter`
    #[arg(long = "type", default_value = "cv")]
    pub document_type: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub content: String,
    #[arg(long)]
    pub employer: Option<String>,
    #[arg(long)]
    pub job_title: Option<String>,
}

#[derive(Debug, Args)]
pub struct DocumentPatchArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub employer: Option<String>,
    #[arg(long)]
    pub job_title: Option<String>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// `cv` or `cover_letter`
    #[arg(long = "type", default_value = "cv")]
    pub document_type: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub employer: String,
    #[arg(long)]
    pub job_title: String,
    #[arg(long, default_value = "")]
    pub job_description: String,
    /// Restrict generation to these experiences (repeatable)
    #[arg(long = "experience")]
    pub experience_ids: Vec<String>,
    #[arg(long = "education")]
    pub education_ids: Vec<String>,
    #[arg(long = "achievement")]
    pub achievement_ids: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum EmployerCommand {
    Scrape { url: String },
    List,
    Show { id: String },
}

impl Command {
    /// Whether the command works on an existing session, so that an auth
    /// failure means "log in first" rather than "bad credentials".
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Health | Command::Login { .. } | Command::Register { .. } | Command::Logout
        )
    }
}

impl From<ExperienceArgs> for ExperienceDraft {
    fn from(args: ExperienceArgs) -> Self {
        ExperienceDraft {
            title: args.title,
            company: args.company,
            location: args.location,
            start_date: args.start_date,
            end_date: args.end_date,
            description: args.description,
            achievements: args.achievements,
        }
    }
}

impl From<ExperiencePatchArgs> for ExperiencePatch {
    fn from(args: ExperiencePatchArgs) -> Self {
        ExperiencePatch {
            title: args.title,
            company: args.company,
            location: args.location,
            start_date: args.start_date,
            end_date: args.end_date,
            description: args.description,
            achievements: args.achievements,
        }
    }
}

impl From<EducationArgs> for EducationDraft {
    fn from(args: EducationArgs) -> Self {
        EducationDraft {
            institution: args.institution,
            degree: args.degree,
            field_of_study: args.field_of_study,
            start_date: args.start_date,
            end_date: args.end_date,
            grade: args.grade,
        }
    }
}

impl From<EducationPatchArgs> for EducationPatch {
    fn from(args: EducationPatchArgs) -> Self {
        EducationPatch {
            institution: args.institution,
            degree: args.degree,
            field_of_study: args.field_of_study,
            start_date: args.start_date,
            end_date: args.end_date,
            grade: args.grade,
        }
    }
}

impl From<AchievementArgs> for AchievementDraft {
    fn from(args: AchievementArgs) -> Self {
        AchievementDraft {
            title: args.title,
            description: args.description,
            date: args.date,
        }
    }
}

impl From<AchievementPatchArgs> for AchievementPatch {
    fn from(args: AchievementPatchArgs) -> Self {
        AchievementPatch {
            title: args.title,
            description: args.description,
            date: args.date,
        }
    }
}

impl From<DocumentPatchArgs> for DocumentPatch {
    fn from(args: DocumentPatchArgs) -> Self {
        DocumentPatch {
            title: args.title,
            content: args.content,
            employer_name: args.employer,
            job_title: args.job_title,
        }
    }
}

impl DocumentArgs {
    pub fn into_draft(self) -> Result<DocumentDraft, resume_client::ClientError> {
        Ok(DocumentDraft {
            title: self.title,
            document_type: self.document_type.parse()?,
            employer_name: self.employer,
            job_title: self.job_title,
            content: self.content,
        })
    }
}

impl GenerateArgs {
    pub fn into_request(self) -> Result<GenerationRequest, resume_client::ClientError> {
        let document_type: DocumentType = self.document_type.parse()?;
        let explicit = !(self.experience_ids.is_empty()
            && self.education_ids.is_empty()
            && self.achievement_ids.is_empty());

        let selection = if explicit {
            ProfileSelection::Selected {
                experience_ids: to_ids(self.experience_ids),
                education_ids: to_ids(self.education_ids),
                achievement_ids: to_ids(self.achievement_ids),
            }
        } else {
            ProfileSelection::All
        };

        Ok(GenerationRequest {
            document_type,
            title: self.title,
            employer_name: self.employer,
            job_title: self.job_title,
            job_description: self.job_description,
            selection,
        })
    }
}

fn to_ids(raw: Vec<String>) -> Vec<RecordId> {
    raw.into_iter().map(RecordId::from).collect()
}
