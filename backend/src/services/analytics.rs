use std::collections::HashMap;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        analytics::{AnalyticsSummary, ApplicationRollup, JobApplicationCount, JobExperienceStats},
        applications::ApplicationStatus,
        jobs::Job,
    },
    store::JobBoardStore,
};

/// Dashboard rollup over all applications to the recruiter's jobs. Counting
/// and averaging happen in the store.
pub async fn recruiter_summary(store: &dyn JobBoardStore, recruiter_id: Uuid) -> Result<AnalyticsSummary> {
    let jobs = store.list_jobs_by_recruiter(recruiter_id).await?;
    let job_ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();
    let rollup = if job_ids.is_empty() {
        ApplicationRollup::default()
    } else {
        store.rollup_applications_by_jobs(&job_ids).await?
    };

    tracing::debug!(
        recruiter_id = %recruiter_id,
        jobs = jobs.len(),
        applicants = rollup.distinct_applicants,
        "Computing analytics summary"
    );

    Ok(summarize(&jobs, rollup))
}

/// Shapes store aggregates into the dashboard response. Rollups of jobs not
/// in `jobs` are ignored; jobs without applications appear in neither per-job list.
pub fn summarize(jobs: &[Job], rollup: ApplicationRollup) -> AnalyticsSummary {
    let titles: HashMap<Uuid, &str> = jobs.iter().map(|job| (job.id, job.title.as_str())).collect();

    let mut status_distribution: IndexMap<ApplicationStatus, u64> =
        ApplicationStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for (status, count) in rollup.status_counts {
        *status_distribution.entry(status).or_default() += u64::try_from(count).unwrap_or_default();
    }

    let per_job: Vec<_> = rollup
        .per_job
        .into_iter()
        .filter_map(|job| titles.get(&job.job_id).map(|title| (title.to_string(), job)))
        .collect();

    let mut per_job_counts: Vec<JobApplicationCount> = per_job
        .iter()
        .map(|(title, job)| JobApplicationCount {
            job_id: job.job_id,
            title: title.clone(),
            count: u64::try_from(job.count).unwrap_or_default(),
        })
        .collect();
    per_job_counts.sort_by(|a, b| b.count.cmp(&a.count));

    let mut avg_experience_per_job: Vec<JobExperienceStats> = per_job
        .into_iter()
        .map(|(title, job)| JobExperienceStats {
            job_id: job.job_id,
            title,
            avg_experience: round_one_decimal(job.avg_experience),
            min_experience: job.min_experience,
            max_experience: job.max_experience,
        })
        .collect();
    avg_experience_per_job.sort_by(|a, b| b.avg_experience.total_cmp(&a.avg_experience));

    AnalyticsSummary {
        total_applicants: u64::try_from(rollup.distinct_applicants).unwrap_or_default(),
        per_job_counts,
        status_distribution,
        avg_experience_per_job,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
