use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{Error, FieldErrors, Result},
    models::{
        jobs::{Job, JobFilter, JobListParams, JobRequest, JobSort, JobWithRecruiter, NewJob},
        pagination::{Page, Pagination},
    },
    services::experience,
    store::{JobBoardStore, JobSearch},
    validation::{
        validate_future_deadline, validate_max_length, validate_optional_string,
        validate_required_string, MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN, MAX_REQUIREMENTS_LEN,
        MAX_TITLE_LEN,
    },
};

/// Creates a job owned by `recruiter_id`. The deadline must lie after `now`.
pub async fn create_job(
    store: &dyn JobBoardStore,
    recruiter_id: Uuid,
    request: JobRequest,
    now: DateTime<Utc>,
) -> Result<Job> {
    let mut errors = FieldErrors::new();

    let title = errors.take(
        "title",
        validate_required_string(&request.title.unwrap_or_default(), "title", "Title", MAX_TITLE_LEN),
    );
    let description = errors.take(
        "description",
        validate_required_string(
            &request.description.unwrap_or_default(),
            "description",
            "Description",
            MAX_DESCRIPTION_LEN,
        ),
    );
    let requirements = errors.take(
        "requirements",
        validate_optional_string(
            request.requirements.as_deref(),
            "requirements",
            "Requirements",
            MAX_REQUIREMENTS_LEN,
        ),
    );
    let location = errors.take(
        "location",
        validate_optional_string(request.location.as_deref(), "location", "Location", MAX_LOCATION_LEN),
    );
    let deadline = match request.deadline.as_deref() {
        Some(raw) => errors.take("deadline", validate_future_deadline(raw, now)),
        None => {
            errors.add("deadline", "Deadline is required");
            None
        }
    };

    let new_job = match (title, description, requirements, location, deadline) {
        (Some(title), Some(description), Some(requirements), Some(location), Some(deadline))
            if errors.is_empty() =>
        {
            NewJob {
                title,
                description,
                requirements,
                location,
                deadline,
                recruiter_id,
            }
        }
        _ => return Err(errors.into_error()),
    };

    let job = store.create_job(new_job).await?;
    tracing::info!(job_id = %job.id, recruiter_id = %recruiter_id, "Job created");

    Ok(job)
}

/// Parses the raw listing query into a filter and a page window.
pub fn parse_list_params(params: JobListParams) -> Result<(JobFilter, Pagination)> {
    let mut errors = FieldErrors::new();

    let pagination = errors.take(
        "page",
        Pagination::parse(params.page.as_deref(), params.page_size.as_deref()),
    );

    let sort = match params.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => JobSort::from_str(raw).unwrap_or_else(|_| {
            errors.add(
                "sort",
                "Sort must be one of createdAt:desc, createdAt:asc, title:asc, title:desc",
            );
            JobSort::default()
        }),
        None => JobSort::default(),
    };

    let experience = match params.experience.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(years) => Some(years),
            Err(_) => {
                errors.add("experience", "Experience must be a non-negative whole number");
                None
            }
        },
        None => None,
    };

    let filter = JobFilter {
        query: non_blank(params.q),
        location: non_blank(params.location),
        sort,
        experience,
    };

    match pagination {
        Some(pagination) if errors.is_empty() => Ok((filter, pagination)),
        _ => Err(errors.into_error()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Lists open jobs. With an experience filter the requirement texts are
/// matched in process, so the window is cut after filtering.
pub async fn list_open_jobs(
    store: &dyn JobBoardStore,
    filter: &JobFilter,
    pagination: Pagination,
    now: DateTime<Utc>,
) -> Result<Page<Job>> {
    let search = JobSearch {
        query: filter.query.clone(),
        location: filter.location.clone(),
        sort: filter.sort,
    };

    let Some(years) = filter.experience else {
        let (jobs, total) = store.search_open_jobs(&search, now, Some(pagination)).await?;
        return Ok(Page::new(jobs, pagination, total));
    };

    let (jobs, _) = store.search_open_jobs(&search, now, None).await?;
    let matching: Vec<Job> = jobs
        .into_iter()
        .filter(|job| experience::accepts(job.requirements.as_deref(), years))
        .collect();

    let total = matching.len() as u64;
    Ok(Page::new(pagination.slice(matching), pagination, total))
}

/// A recruiter's own jobs, newest first, expired ones included.
pub async fn list_recruiter_jobs(store: &dyn JobBoardStore, recruiter_id: Uuid) -> Result<Vec<Job>> {
    store.list_jobs_by_recruiter(recruiter_id).await
}

pub async fn get_job(store: &dyn JobBoardStore, id: Uuid) -> Result<JobWithRecruiter> {
    let job = find_job(store, id).await?;
    let recruiter = store
        .get_profiles_by_ids(&[job.recruiter_id])
        .await?
        .into_iter()
        .next();

    Ok(JobWithRecruiter { job, recruiter })
}

pub(crate) async fn find_job(store: &dyn JobBoardStore, id: Uuid) -> Result<Job> {
    store
        .get_job_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".to_string()))
}

/// Loads a job and checks that `caller_id` posted it.
pub(crate) async fn find_owned_job(
    store: &dyn JobBoardStore,
    id: Uuid,
    caller_id: Uuid,
    forbidden_message: &str,
) -> Result<Job> {
    let job = find_job(store, id).await?;
    if job.recruiter_id != caller_id {
        tracing::warn!(job_id = %id, caller_id = %caller_id, "Rejected access to another recruiter's job");
        return Err(Error::Forbidden(forbidden_message.to_string()));
    }
    Ok(job)
}

/// Merges the provided fields into the caller's job.
pub async fn update_job(
    store: &dyn JobBoardStore,
    id: Uuid,
    caller_id: Uuid,
    request: JobRequest,
    now: DateTime<Utc>,
) -> Result<Job> {
    let mut errors = FieldErrors::new();

    let title = request
        .title
        .as_deref()
        .and_then(|raw| errors.take("title", validate_required_string(raw, "title", "Title", MAX_TITLE_LEN)));
    let description = request.description.as_deref().and_then(|raw| {
        errors.take(
            "description",
            validate_required_string(raw, "description", "Description", MAX_DESCRIPTION_LEN),
        )
    });
    if let Some(raw) = request.requirements.as_deref() {
        errors.check(
            "requirements",
            validate_max_length(raw.trim(), "requirements", "Requirements", MAX_REQUIREMENTS_LEN),
        );
    }
    if let Some(raw) = request.location.as_deref() {
        errors.check(
            "location",
            validate_max_length(raw.trim(), "location", "Location", MAX_LOCATION_LEN),
        );
    }
    let deadline = request
        .deadline
        .as_deref()
        .and_then(|raw| errors.take("deadline", validate_future_deadline(raw, now)));

    errors.into_result()?;

    let mut job = find_owned_job(store, id, caller_id, "You can only update your own jobs").await?;

    if let Some(title) = title {
        job.title = title;
    }
    if let Some(description) = description {
        job.description = description;
    }
    if let Some(requirements) = request.requirements {
        job.requirements = non_blank(Some(requirements));
    }
    if let Some(location) = request.location {
        job.location = non_blank(Some(location));
    }
    if let Some(deadline) = deadline {
        job.deadline = deadline;
    }

    let job = store.update_job(&job).await?;
    tracing::info!(job_id = %job.id, "Job updated");

    Ok(job)
}

/// Deletes the caller's job after removing its applications.
pub async fn delete_job(store: &dyn JobBoardStore, id: Uuid, caller_id: Uuid) -> Result<()> {
    find_owned_job(store, id, caller_id, "You can only delete your own jobs").await?;

    let removed = store.delete_applications_by_job(id).await?;
    store.delete_job(id).await?;
    tracing::info!(job_id = %id, applications_removed = removed, "Job deleted");

    Ok(())
}
