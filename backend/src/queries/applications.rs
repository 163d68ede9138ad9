use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::{
        analytics::{ApplicationRollup, JobRollup},
        applications::{Application, ApplicationStatus, NewApplication, Resume},
    },
};

use super::{is_foreign_key_violation, is_unique_violation, jobs::Window};
use crate::DbConn;

/// Creates an application. The `(job_id, applicant_id)` unique index turns a
/// concurrent duplicate into a `Conflict`, and a job deleted since it was
/// looked up surfaces as `NotFound`.
pub async fn create_application(conn: &mut DbConn, new_application: NewApplication) -> Result<Application> {
    let (resume_file_name, resume_data) = match new_application.resume {
        Some(resume) => (Some(resume.file_name), Some(resume.content.to_vec())),
        None => (None, None),
    };

    let application = sqlx::query_as::<_, Application>(
        r#"
        INSERT INTO applications (
            id, job_id, applicant_id, status, applicant_name, applicant_email,
            applicant_phone, years_of_experience, applicant_current_role, cover_letter,
            resume_file_name, resume_data
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id, job_id, applicant_id, status, applicant_name, applicant_email,
                  applicant_phone, years_of_experience, applicant_current_role, cover_letter,
                  notes, resume_file_name, created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(new_application.job_id)
    .bind(new_application.applicant_id)
    .bind(ApplicationStatus::Applied)
    .bind(&new_application.applicant_name)
    .bind(&new_application.applicant_email)
    .bind(&new_application.applicant_phone)
    .bind(new_application.years_of_experience)
    .bind(&new_application.current_role)
    .bind(&new_application.cover_letter)
    .bind(resume_file_name)
    .bind(resume_data)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::Conflict("You have already applied to this job".to_string())
        } else if is_foreign_key_violation(&e) {
            Error::NotFound("Job not found".to_string())
        } else {
            Error::Sqlx(e)
        }
    })?;

    Ok(application)
}

/// Gets a single application by its ID, without resume bytes.
pub async fn get_application_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Application>> {
    let application = sqlx::query_as::<_, Application>(
        r#"
        SELECT id, job_id, applicant_id, status, applicant_name, applicant_email,
               applicant_phone, years_of_experience, applicant_current_role, cover_letter,
               notes, resume_file_name, created_at, updated_at
        FROM applications
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(application)
}

/// Finds the application an applicant submitted to a job, if any.
pub async fn get_application_for_job_and_applicant(
    conn: &mut DbConn,
    job_id: Uuid,
    applicant_id: Uuid,
) -> Result<Option<Application>> {
    let application = sqlx::query_as::<_, Application>(
        r#"
        SELECT id, job_id, applicant_id, status, applicant_name, applicant_email,
               applicant_phone, years_of_experience, applicant_current_role, cover_letter,
               notes, resume_file_name, created_at, updated_at
        FROM applications
        WHERE job_id = $1 AND applicant_id = $2
        "#,
    )
    .bind(job_id)
    .bind(applicant_id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(application)
}

/// Lists an applicant's applications newest first, with the total count.
pub async fn list_applications_by_applicant(
    conn: &mut DbConn,
    applicant_id: Uuid,
    window: Window,
) -> Result<(Vec<Application>, i64)> {
    let applications = sqlx::query_as::<_, Application>(
        r#"
        SELECT id, job_id, applicant_id, status, applicant_name, applicant_email,
               applicant_phone, years_of_experience, applicant_current_role, cover_letter,
               notes, resume_file_name, created_at, updated_at
        FROM applications
        WHERE applicant_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(applicant_id)
    .bind(window.limit)
    .bind(window.offset)
    .fetch_all(&mut *conn)
    .await
    .map_err(Error::Sqlx)?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE applicant_id = $1")
        .bind(applicant_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok((applications, total))
}

/// Lists the applications of the given jobs newest first.
pub async fn list_applications_by_jobs(conn: &mut DbConn, job_ids: &[Uuid]) -> Result<Vec<Application>> {
    let applications = sqlx::query_as::<_, Application>(
        r#"
        SELECT id, job_id, applicant_id, status, applicant_name, applicant_email,
               applicant_phone, years_of_experience, applicant_current_role, cover_letter,
               notes, resume_file_name, created_at, updated_at
        FROM applications
        WHERE job_id = ANY($1)
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(job_ids)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(applications)
}

/// Aggregates the applications of the given jobs: distinct applicants,
/// counts per status and per-job experience statistics.
pub async fn rollup_applications_by_jobs(conn: &mut DbConn, job_ids: &[Uuid]) -> Result<ApplicationRollup> {
    let distinct_applicants: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT applicant_id) FROM applications WHERE job_id = ANY($1)",
    )
    .bind(job_ids)
    .fetch_one(&mut *conn)
    .await
    .map_err(Error::Sqlx)?;

    let status_counts = sqlx::query_as::<_, (ApplicationStatus, i64)>(
        r#"
        SELECT status, COUNT(*)
        FROM applications
        WHERE job_id = ANY($1)
        GROUP BY status
        "#,
    )
    .bind(job_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(Error::Sqlx)?;

    let per_job = sqlx::query_as::<_, JobRollup>(
        r#"
        SELECT job_id,
               COUNT(*) AS count,
               AVG(years_of_experience)::float8 AS avg_experience,
               MIN(years_of_experience) AS min_experience,
               MAX(years_of_experience) AS max_experience
        FROM applications
        WHERE job_id = ANY($1)
        GROUP BY job_id
        "#,
    )
    .bind(job_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(ApplicationRollup {
        distinct_applicants,
        status_counts,
        per_job,
    })
}

/// Overwrites the recruiter-owned fields of an application.
pub async fn update_application_review(
    conn: &mut DbConn,
    id: Uuid,
    status: ApplicationStatus,
    notes: Option<&str>,
) -> Result<Option<Application>> {
    let application = sqlx::query_as::<_, Application>(
        r#"
        UPDATE applications
        SET status = $1, notes = $2, updated_at = now()
        WHERE id = $3
        RETURNING id, job_id, applicant_id, status, applicant_name, applicant_email,
                  applicant_phone, years_of_experience, applicant_current_role, cover_letter,
                  notes, resume_file_name, created_at, updated_at
        "#,
    )
    .bind(status)
    .bind(notes)
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(application)
}

/// Loads the stored resume of an application, if both name and bytes exist.
pub async fn get_resume(conn: &mut DbConn, id: Uuid) -> Result<Option<Resume>> {
    let row: Option<(Option<String>, Option<Vec<u8>>)> = sqlx::query_as(
        r#"
        SELECT resume_file_name, resume_data
        FROM applications
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(match row {
        Some((Some(file_name), Some(content))) => Some(Resume {
            file_name,
            content: content.into(),
        }),
        _ => None,
    })
}

/// Deletes every application of a job.
pub async fn delete_applications_by_job(conn: &mut DbConn, job_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM applications WHERE job_id = $1")
        .bind(job_id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}

/// Deletes applications whose job no longer exists.
pub async fn delete_orphaned_applications(conn: &mut DbConn) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM applications a
        WHERE NOT EXISTS (SELECT 1 FROM jobs j WHERE j.id = a.job_id)
        "#,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
