//! Job posting handlers
//!
//! Listing and reading jobs is public; everything else requires a
//! recruiter token and ownership of the job.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    error::Result,
    middleware::AuthenticatedUser,
    models::{
        jobs::{Job, JobListParams, JobRequest},
        pagination::Page,
        users::Role,
    },
    services::{applications as application_services, jobs as job_services},
    state::AppState,
    validation::validate_uuid,
};

use super::log_handler_error;

// ============================================================================
// LIST OPEN JOBS
// ============================================================================

/// GET /api/jobs
///
/// Open jobs only (deadline in the future).
///
/// # Query Parameters
/// - `q`: matched against title or description
/// - `location`: matched against location
/// - `sort`: `createdAt:desc` (default), `createdAt:asc`, `title:asc`, `title:desc`
/// - `page`, `pageSize`: 1-based window, page size 1..=1000
/// - `experience`: applicant's years; keeps jobs whose requirements accept it
pub async fn list_jobs(
    State(state): State<AppState>,
    params: std::result::Result<Query<JobListParams>, QueryRejection>,
) -> Result<Json<Page<Job>>> {
    let Query(params) = params?;
    let (filter, pagination) = job_services::parse_list_params(params)?;

    let page = job_services::list_open_jobs(state.store.as_ref(), &filter, pagination, Utc::now())
        .await
        .inspect_err(|e| log_handler_error("list_jobs", e))?;

    Ok(Json(page))
}

// ============================================================================
// RECRUITER'S OWN JOBS
// ============================================================================

/// GET /api/jobs/my-jobs
pub async fn list_my_jobs(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    auth_user.require(&[Role::Recruiter])?;

    let jobs = job_services::list_recruiter_jobs(state.store.as_ref(), auth_user.id)
        .await
        .inspect_err(|e| log_handler_error("list_my_jobs", e))?;

    Ok(Json(serde_json::json!({ "items": jobs })))
}

// ============================================================================
// CREATE JOB
// ============================================================================

/// POST /api/jobs
///
/// # HTTP Status Codes
/// - `201 CREATED`: `{job}`
/// - `400 BAD_REQUEST`: Missing or invalid fields, deadline not in the future
/// - `403 FORBIDDEN`: Caller is not a recruiter
pub async fn create_job(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    payload: std::result::Result<Json<JobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    auth_user.require(&[Role::Recruiter])?;
    let Json(request) = payload?;

    let job = job_services::create_job(state.store.as_ref(), auth_user.id, request, Utc::now())
        .await
        .inspect_err(|e| log_handler_error("create_job", e))?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "job": job }))))
}

// ============================================================================
// GET JOB
// ============================================================================

/// GET /api/jobs/{id}
///
/// Public; expired jobs stay readable by id.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = validate_uuid(&id)?;

    let job = job_services::get_job(state.store.as_ref(), id)
        .await
        .inspect_err(|e| log_handler_error("get_job", e))?;

    Ok(Json(serde_json::json!({ "job": job })))
}

// ============================================================================
// UPDATE JOB
// ============================================================================

/// PATCH /api/jobs/{id}
///
/// Partial update; only provided fields change.
pub async fn update_job(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: std::result::Result<Json<JobRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    auth_user.require(&[Role::Recruiter])?;
    let id = validate_uuid(&id)?;
    let Json(request) = payload?;

    let job = job_services::update_job(state.store.as_ref(), id, auth_user.id, request, Utc::now())
        .await
        .inspect_err(|e| log_handler_error("update_job", e))?;

    Ok(Json(serde_json::json!({ "job": job })))
}

// ============================================================================
// DELETE JOB
// ============================================================================

/// DELETE /api/jobs/{id}
///
/// Removes the job and every application to it. Responds 204.
pub async fn delete_job(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    auth_user.require(&[Role::Recruiter])?;
    let id = validate_uuid(&id)?;

    job_services::delete_job(state.store.as_ref(), id, auth_user.id)
        .await
        .inspect_err(|e| log_handler_error("delete_job", e))?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// APPLICATIONS OF A JOB
// ============================================================================

/// GET /api/jobs/{id}/applications
///
/// Applications grouped by status, every status present.
pub async fn list_job_applications(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    auth_user.require(&[Role::Recruiter])?;
    let id = validate_uuid(&id)?;

    let by_status =
        application_services::list_job_applications_by_status(state.store.as_ref(), id, auth_user.id)
            .await
            .inspect_err(|e| log_handler_error("list_job_applications", e))?;

    Ok(Json(serde_json::json!({ "byStatus": by_status })))
}
