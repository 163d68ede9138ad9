//! Application handlers
//!
//! Submissions arrive as multipart forms with an optional PDF resume.
//! Read access is shared by the applicant and the recruiter owning the job.

use axum::{
    body::Body,
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::{
    error::{Error, Result},
    middleware::AuthenticatedUser,
    models::{
        applications::{ApplicationDetail, ApplicationReview, ApplicationSubmission, ResumeUpload},
        pagination::{Page, Pagination, PaginationParams},
        users::Role,
    },
    services::applications::{self as application_services, PDF_CONTENT_TYPE},
    state::AppState,
    validation::validate_uuid,
};

use super::log_handler_error;

// ============================================================================
// SUBMIT APPLICATION
// ============================================================================

/// POST /api/applications
///
/// # Form Fields
/// - `jobId`, `applicantName`, `applicantEmail`, `applicantPhone`,
///   `yearsOfExperience`: required
/// - `currentRole`, `coverLetter`: optional
/// - `resume`: optional PDF file
///
/// # HTTP Status Codes
/// - `201 CREATED`: `{application}`
/// - `400 BAD_REQUEST`: Missing fields, bad upload, or deadline passed
/// - `403 FORBIDDEN`: Caller is not an applicant
/// - `404 NOT_FOUND`: Job does not exist
/// - `409 CONFLICT`: Already applied to this job
pub async fn submit_application(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    auth_user.require(&[Role::Applicant])?;
    let max_bytes = state.config.uploads.max_resume_bytes;

    let submission = read_submission(multipart?, max_bytes)
        .await
        .inspect_err(|e| log_handler_error("submit_application", e))?;

    let application = application_services::submit_application(
        state.store.as_ref(),
        auth_user.id,
        submission,
        max_bytes,
        Utc::now(),
    )
    .await
    .inspect_err(|e| log_handler_error("submit_application", e))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "application": application })),
    ))
}

/// Collects the known form fields; unknown parts are skipped.
async fn read_submission(mut multipart: Multipart, max_bytes: usize) -> Result<ApplicationSubmission> {
    let mut submission = ApplicationSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, max_bytes))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let content = field.bytes().await.map_err(|e| upload_error(e, max_bytes))?;
                submission.resume = Some(ResumeUpload {
                    file_name,
                    content_type,
                    content,
                });
            }
            "jobId" => submission.job_id = Some(text(field, max_bytes).await?),
            "applicantName" => submission.applicant_name = Some(text(field, max_bytes).await?),
            "applicantEmail" => submission.applicant_email = Some(text(field, max_bytes).await?),
            "applicantPhone" => submission.applicant_phone = Some(text(field, max_bytes).await?),
            "yearsOfExperience" => {
                submission.years_of_experience = Some(text(field, max_bytes).await?)
            }
            "currentRole" => submission.current_role = Some(text(field, max_bytes).await?),
            "coverLetter" => submission.cover_letter = Some(text(field, max_bytes).await?),
            _ => {}
        }
    }

    Ok(submission)
}

async fn text(field: Field<'_>, max_bytes: usize) -> Result<String> {
    field.text().await.map_err(|e| upload_error(e, max_bytes))
}

/// A body cut off by the request limit reads as an oversized resume.
fn upload_error(error: MultipartError, max_bytes: usize) -> Error {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::BadRequest(format!(
            "Resume must be {}MB or smaller",
            max_bytes / (1024 * 1024)
        ));
    }
    Error::from(error)
}

// ============================================================================
// MY APPLICATIONS
// ============================================================================

/// GET /api/applications/me
///
/// The caller's applications, newest first, each with its job.
pub async fn list_my_applications(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    params: std::result::Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<Page<ApplicationDetail>>> {
    auth_user.require(&[Role::Applicant])?;
    let Query(params) = params?;
    let pagination = Pagination::parse(params.page.as_deref(), params.page_size.as_deref())?;

    let page = application_services::list_my_applications(state.store.as_ref(), auth_user.id, pagination)
        .await
        .inspect_err(|e| log_handler_error("list_my_applications", e))?;

    Ok(Json(page))
}

// ============================================================================
// GET / REVIEW APPLICATION
// ============================================================================

/// GET /api/applications/{id}
pub async fn get_application(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = validate_uuid(&id)?;

    let application = application_services::get_application(state.store.as_ref(), id, auth_user.caller())
        .await
        .inspect_err(|e| log_handler_error("get_application", e))?;

    Ok(Json(serde_json::json!({ "application": application })))
}

/// PATCH /api/applications/{id}
///
/// Recruiter review: `status` and `notes` only.
pub async fn review_application(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ApplicationReview>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    auth_user.require(&[Role::Recruiter])?;
    let id = validate_uuid(&id)?;
    let Json(review) = payload?;

    let application =
        application_services::review_application(state.store.as_ref(), id, auth_user.id, review)
            .await
            .inspect_err(|e| log_handler_error("review_application", e))?;

    Ok(Json(serde_json::json!({ "application": application })))
}

// ============================================================================
// RESUME DOWNLOAD
// ============================================================================

/// GET /api/applications/{id}/resume
///
/// Streams the stored PDF as an attachment. Also accepts `?token=` so the
/// file can be opened from a plain link.
pub async fn download_resume(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = validate_uuid(&id)?;

    let resume = application_services::get_resume(state.store.as_ref(), id, auth_user.caller())
        .await
        .inspect_err(|e| log_handler_error("download_resume", e))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        content_disposition_file_name(&resume.file_name)
    );

    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(resume.content),
    )
        .into_response())
}

/// Keeps the name usable inside a quoted header parameter.
fn content_disposition_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect()
}
