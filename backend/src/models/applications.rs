use bytes::Bytes;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use super::{jobs::Job, users::UserProfile};

/// Review stage of an application.
///
/// Any status may be overwritten by any other; the order of [`ApplicationStatus::ALL`]
/// is the column order of the recruiter's board.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    UnderReview,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
    ];
}

/// An application as returned by default reads. Resume bytes are never
/// loaded here; see [`Resume`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub years_of_experience: i32,
    #[sqlx(rename = "applicant_current_role")]
    pub current_role: Option<String>,
    pub cover_letter: Option<String>,
    pub notes: Option<String>,
    pub resume_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored resume attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resume {
    pub file_name: String,
    pub content: Bytes,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub years_of_experience: i32,
    pub current_role: Option<String>,
    pub cover_letter: Option<String>,
    pub resume: Option<Resume>,
}

/// Form fields of `POST /applications`, collected from the multipart body.
#[derive(Debug, Clone, Default)]
pub struct ApplicationSubmission {
    pub job_id: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_phone: Option<String>,
    pub years_of_experience: Option<String>,
    pub current_role: Option<String>,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumeUpload>,
}

/// A file part as received, before type and size checks.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

/// Recruiter review update; only these two fields are mutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationReview {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// An application with its job and applicant joined in.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<UserProfile>,
}

/// Applications of one job bucketed by status, in board order.
pub type ApplicationsByStatus = IndexMap<ApplicationStatus, Vec<ApplicationDetail>>;
