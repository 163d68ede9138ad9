use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{Error, FieldErrors, Result},
    models::{
        applications::{
            Application, ApplicationDetail, ApplicationReview, ApplicationStatus,
            ApplicationSubmission, ApplicationsByStatus, NewApplication, Resume, ResumeUpload,
        },
        pagination::{Page, Pagination},
        users::Role,
    },
    services::jobs::{find_job, find_owned_job},
    store::JobBoardStore,
    validation::{
        normalize_email, validate_email, validate_max_length, validate_optional_string,
        validate_phone, validate_required_string, validate_uuid, validate_years_of_experience,
        MAX_COVER_LETTER_LEN, MAX_CURRENT_ROLE_LEN, MAX_FILE_NAME_LEN, MAX_NAME_LEN, MAX_NOTES_LEN,
    },
};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Who is asking; applications are visible to their applicant and to the
/// recruiter owning the job.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

/// Checks type and size of an uploaded resume before anything is stored.
pub fn validate_resume(upload: ResumeUpload, max_bytes: usize) -> Result<Resume> {
    let content_type = upload
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase());
    if content_type.as_deref() != Some(PDF_CONTENT_TYPE) {
        return Err(Error::BadRequest("Only PDF files are allowed".to_string()));
    }

    if upload.content.len() > max_bytes {
        return Err(Error::BadRequest(format!(
            "Resume must be {}MB or smaller",
            max_bytes / (1024 * 1024)
        )));
    }

    let file_name = upload.file_name.trim().to_string();
    if file_name.is_empty() {
        return Err(Error::BadRequest("Resume file name is required".to_string()));
    }
    validate_max_length(&file_name, "resume", "Resume file name", MAX_FILE_NAME_LEN)?;

    Ok(Resume {
        file_name,
        content: upload.content,
    })
}

fn required(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Submits an application for `applicant_id`. Returns it with its job and
/// applicant profile joined.
pub async fn submit_application(
    store: &dyn JobBoardStore,
    applicant_id: Uuid,
    submission: ApplicationSubmission,
    max_resume_bytes: usize,
    now: DateTime<Utc>,
) -> Result<ApplicationDetail> {
    let resume = submission
        .resume
        .map(|upload| validate_resume(upload, max_resume_bytes))
        .transpose()?;

    if !(required(&submission.job_id)
        && required(&submission.applicant_name)
        && required(&submission.applicant_email)
        && required(&submission.applicant_phone)
        && required(&submission.years_of_experience))
    {
        return Err(Error::BadRequest("Missing required fields".to_string()));
    }

    let job_id = validate_uuid(submission.job_id.as_deref().unwrap_or_default())?;

    let mut errors = FieldErrors::new();
    let applicant_name = errors.take(
        "applicantName",
        validate_required_string(
            submission.applicant_name.as_deref().unwrap_or_default(),
            "applicantName",
            "Name",
            MAX_NAME_LEN,
        ),
    );
    let applicant_email = submission.applicant_email.as_deref().unwrap_or_default();
    errors.check("applicantEmail", validate_email(applicant_email));
    let applicant_phone = submission.applicant_phone.as_deref().unwrap_or_default().trim();
    errors.check("applicantPhone", validate_phone(applicant_phone));
    let years_of_experience = errors.take(
        "yearsOfExperience",
        validate_years_of_experience(submission.years_of_experience.as_deref().unwrap_or_default()),
    );
    let current_role = errors.take(
        "currentRole",
        validate_optional_string(
            submission.current_role.as_deref(),
            "currentRole",
            "Current role",
            MAX_CURRENT_ROLE_LEN,
        ),
    );
    let cover_letter = errors.take(
        "coverLetter",
        validate_optional_string(
            submission.cover_letter.as_deref(),
            "coverLetter",
            "Cover letter",
            MAX_COVER_LETTER_LEN,
        ),
    );

    let new_application = match (applicant_name, years_of_experience, current_role, cover_letter) {
        (Some(applicant_name), Some(years_of_experience), Some(current_role), Some(cover_letter))
            if errors.is_empty() =>
        {
            NewApplication {
                job_id,
                applicant_id,
                applicant_name,
                applicant_email: normalize_email(applicant_email),
                applicant_phone: applicant_phone.to_string(),
                years_of_experience,
                current_role,
                cover_letter,
                resume,
            }
        }
        _ => return Err(errors.into_error()),
    };

    let job = find_job(store, job_id).await?;
    if !job.is_open_at(now) {
        return Err(Error::BadRequest("Job application deadline has passed".to_string()));
    }

    if store.get_application_for(job_id, applicant_id).await?.is_some() {
        return Err(Error::Conflict("You have already applied to this job".to_string()));
    }

    let application = store.create_application(new_application).await?;
    tracing::info!(
        application_id = %application.id,
        job_id = %job_id,
        applicant_id = %applicant_id,
        has_resume = application.resume_file_name.is_some(),
        "Application submitted"
    );

    let applicant = store.get_profiles_by_ids(&[applicant_id]).await?.into_iter().next();
    Ok(ApplicationDetail {
        application,
        job: Some(job),
        applicant,
    })
}

/// The caller's applications, newest first, each with its job.
pub async fn list_my_applications(
    store: &dyn JobBoardStore,
    applicant_id: Uuid,
    pagination: Pagination,
) -> Result<Page<ApplicationDetail>> {
    let (applications, total) = store
        .list_applications_by_applicant(applicant_id, pagination)
        .await?;
    let items = join_details(store, applications, true, false).await?;
    Ok(Page::new(items, pagination, total))
}

async fn find_application(store: &dyn JobBoardStore, id: Uuid) -> Result<Application> {
    store
        .get_application_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))
}

/// Read access: applicants see their own, recruiters see those for jobs they own.
async fn ensure_can_read(
    store: &dyn JobBoardStore,
    application: &Application,
    caller: Caller,
    applicant_message: &str,
    recruiter_message: &str,
) -> Result<()> {
    let allowed = match caller.role {
        Role::Applicant => application.applicant_id == caller.id,
        Role::Recruiter => store
            .get_job_by_id(application.job_id)
            .await?
            .is_some_and(|job| job.recruiter_id == caller.id),
    };

    if allowed {
        return Ok(());
    }

    tracing::warn!(
        application_id = %application.id,
        caller_id = %caller.id,
        "Rejected access to another user's application"
    );
    let message = match caller.role {
        Role::Applicant => applicant_message,
        Role::Recruiter => recruiter_message,
    };
    Err(Error::Forbidden(message.to_string()))
}

pub async fn get_application(
    store: &dyn JobBoardStore,
    id: Uuid,
    caller: Caller,
) -> Result<ApplicationDetail> {
    let application = find_application(store, id).await?;
    ensure_can_read(
        store,
        &application,
        caller,
        "You can only view your own applications",
        "You can only view applications for your own jobs",
    )
    .await?;

    let mut details = join_details(store, vec![application], true, true).await?;
    details
        .pop()
        .ok_or_else(|| Error::Internal("Joined application went missing".to_string()))
}

/// Updates status and notes of an application to one of the caller's jobs.
pub async fn review_application(
    store: &dyn JobBoardStore,
    id: Uuid,
    caller_id: Uuid,
    review: ApplicationReview,
) -> Result<ApplicationDetail> {
    let mut errors = FieldErrors::new();

    let status = match review.status.as_deref() {
        Some(raw) => match ApplicationStatus::from_str(raw.trim()) {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add(
                    "status",
                    "Status must be one of APPLIED, UNDER_REVIEW, INTERVIEW, OFFER, REJECTED",
                );
                None
            }
        },
        None => None,
    };
    if let Some(notes) = review.notes.as_deref() {
        errors.check("notes", validate_max_length(notes, "notes", "Notes", MAX_NOTES_LEN));
    }
    errors.into_result()?;

    let application = find_application(store, id).await?;
    find_owned_job(
        store,
        application.job_id,
        caller_id,
        "You can only update applications for your own jobs",
    )
    .await
    .map_err(|e| match e {
        // A vanished job is an ownership failure from the caller's point of view
        Error::NotFound(_) => {
            Error::Forbidden("You can only update applications for your own jobs".to_string())
        }
        other => other,
    })?;

    let status = status.unwrap_or(application.status);
    let notes = match review.notes {
        Some(notes) => Some(notes).filter(|n| !n.trim().is_empty()),
        None => application.notes,
    };

    let updated = store
        .update_application_review(id, status, notes.as_deref())
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
    tracing::info!(application_id = %id, status = %status, "Application reviewed");

    let mut details = join_details(store, vec![updated], true, true).await?;
    details
        .pop()
        .ok_or_else(|| Error::Internal("Joined application went missing".to_string()))
}

/// Loads the resume attachment under the same access rule as reads.
pub async fn get_resume(store: &dyn JobBoardStore, id: Uuid, caller: Caller) -> Result<Resume> {
    let application = find_application(store, id).await?;
    ensure_can_read(
        store,
        &application,
        caller,
        "You can only view your own resume",
        "You can only view resumes for your own jobs",
    )
    .await?;

    store
        .get_resume(id)
        .await?
        .ok_or_else(|| Error::NotFound("No resume found for this application".to_string()))
}

/// Applications of one of the caller's jobs, bucketed by status in board
/// order, newest first within each bucket.
pub async fn list_job_applications_by_status(
    store: &dyn JobBoardStore,
    job_id: Uuid,
    caller_id: Uuid,
) -> Result<ApplicationsByStatus> {
    find_owned_job(
        store,
        job_id,
        caller_id,
        "You can only view applications for your own jobs",
    )
    .await?;

    let applications = store.list_applications_by_jobs(&[job_id]).await?;
    let details = join_details(store, applications, false, true).await?;

    let mut by_status: ApplicationsByStatus = ApplicationStatus::ALL
        .iter()
        .map(|status| (*status, Vec::new()))
        .collect();
    for detail in details {
        by_status
            .entry(detail.application.status)
            .or_default()
            .push(detail);
    }

    Ok(by_status)
}

/// Attaches jobs and/or applicant profiles to applications, preserving order.
async fn join_details(
    store: &dyn JobBoardStore,
    applications: Vec<Application>,
    with_job: bool,
    with_applicant: bool,
) -> Result<Vec<ApplicationDetail>> {
    let mut jobs = HashMap::new();
    if with_job {
        let ids: Vec<Uuid> = unique(applications.iter().map(|a| a.job_id));
        for job in store.get_jobs_by_ids(&ids).await? {
            jobs.insert(job.id, job);
        }
    }

    let mut profiles = HashMap::new();
    if with_applicant {
        let ids: Vec<Uuid> = unique(applications.iter().map(|a| a.applicant_id));
        for profile in store.get_profiles_by_ids(&ids).await? {
            profiles.insert(profile.id, profile);
        }
    }

    Ok(applications
        .into_iter()
        .map(|application| ApplicationDetail {
            job: jobs.get(&application.job_id).cloned(),
            applicant: profiles.get(&application.applicant_id).cloned(),
            application,
        })
        .collect())
}

fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
