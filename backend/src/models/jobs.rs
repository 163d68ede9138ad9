use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use super::users::UserProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub deadline: DateTime<Utc>,
    pub recruiter_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// A job accepts applications until its deadline has passed.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline > now
    }
}

/// A job with its recruiter's public profile populated.
#[derive(Debug, Clone, Serialize)]
pub struct JobWithRecruiter {
    #[serde(flatten)]
    pub job: Job,
    pub recruiter: Option<UserProfile>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub deadline: DateTime<Utc>,
    pub recruiter_id: Uuid,
}

/// HTTP body for creating (all required fields present) or patching a job.
///
/// Fields stay optional at the serde level so missing values are reported as
/// field-level validation errors instead of a generic parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub location: Option<String>,
    /// RFC 3339 timestamp
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
pub enum JobSort {
    #[default]
    #[strum(serialize = "createdAt:desc")]
    CreatedAtDesc,
    #[strum(serialize = "createdAt:asc")]
    CreatedAtAsc,
    #[strum(serialize = "title:asc")]
    TitleAsc,
    #[strum(serialize = "title:desc")]
    TitleDesc,
}

/// Search criteria for the public job listing.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Case-insensitive substring matched against title or description
    pub query: Option<String>,
    /// Case-insensitive substring matched against location
    pub location: Option<String>,
    pub sort: JobSort,
    /// Applicant's years of experience, matched against requirements text
    pub experience: Option<u32>,
}

/// Raw query string of `GET /jobs`; parsed by the job service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListParams {
    pub q: Option<String>,
    pub location: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub experience: Option<String>,
}
