use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use super::applications::ApplicationStatus;

/// Recruiter dashboard rollup over applications to the recruiter's own jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// Distinct applicants across all of the recruiter's jobs
    pub total_applicants: u64,
    pub per_job_counts: Vec<JobApplicationCount>,
    /// Always contains every status, zero-filled
    pub status_distribution: IndexMap<ApplicationStatus, u64>,
    pub avg_experience_per_job: Vec<JobExperienceStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationCount {
    pub job_id: Uuid,
    pub title: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExperienceStats {
    pub job_id: Uuid,
    pub title: String,
    /// Mean years of experience, rounded to one decimal
    pub avg_experience: f64,
    pub min_experience: i32,
    pub max_experience: i32,
}

/// Application aggregates for one job, as computed by the store.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct JobRollup {
    pub job_id: Uuid,
    pub count: i64,
    pub avg_experience: f64,
    pub min_experience: i32,
    pub max_experience: i32,
}

/// Store-side aggregates over the applications of a set of jobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationRollup {
    pub distinct_applicants: i64,
    /// Only statuses that occur at least once
    pub status_counts: Vec<(ApplicationStatus, i64)>,
    pub per_job: Vec<JobRollup>,
}
