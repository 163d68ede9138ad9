use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::jobs::{Job, JobSort, NewJob},
};

use crate::DbConn;

/// Optional LIMIT/OFFSET window for listing queries.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

/// Creates a new job posting.
pub async fn create_job(conn: &mut DbConn, new_job: NewJob) -> Result<Job> {
    let job = sqlx::query_as::<_, Job>(
        r#"
        INSERT INTO jobs (id, title, description, requirements, location, deadline, recruiter_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, title, description, requirements, location, deadline, recruiter_id, created_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_job.title)
    .bind(&new_job.description)
    .bind(&new_job.requirements)
    .bind(&new_job.location)
    .bind(new_job.deadline)
    .bind(new_job.recruiter_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(job)
}

/// Gets a single job by its ID. The job may not exist.
pub async fn get_job_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Job>> {
    let job = sqlx::query_as::<_, Job>(
        r#"
        SELECT id, title, description, requirements, location, deadline, recruiter_id, created_at
        FROM jobs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(job)
}

/// Gets the jobs with the given IDs, in no particular order.
pub async fn get_jobs_by_ids(conn: &mut DbConn, ids: &[Uuid]) -> Result<Vec<Job>> {
    let jobs = sqlx::query_as::<_, Job>(
        r#"
        SELECT id, title, description, requirements, location, deadline, recruiter_id, created_at
        FROM jobs
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(jobs)
}

/// Lists every job owned by a recruiter, newest first.
pub async fn list_jobs_by_recruiter(conn: &mut DbConn, recruiter_id: Uuid) -> Result<Vec<Job>> {
    let jobs = sqlx::query_as::<_, Job>(
        r#"
        SELECT id, title, description, requirements, location, deadline, recruiter_id, created_at
        FROM jobs
        WHERE recruiter_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(recruiter_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(jobs)
}

fn order_by(sort: JobSort) -> &'static str {
    match sort {
        JobSort::CreatedAtDesc => "created_at DESC, id DESC",
        JobSort::CreatedAtAsc => "created_at ASC, id ASC",
        JobSort::TitleAsc => "lower(title) ASC, id ASC",
        JobSort::TitleDesc => "lower(title) DESC, id DESC",
    }
}

/// Escapes LIKE wildcards so user input is matched literally.
pub fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Searches open jobs. Returns the requested window and the total number of matches.
pub async fn search_open_jobs(
    conn: &mut DbConn,
    query: Option<&str>,
    location: Option<&str>,
    sort: JobSort,
    now: DateTime<Utc>,
    window: Option<Window>,
) -> Result<(Vec<Job>, i64)> {
    let query_pattern = query.map(like_pattern);
    let location_pattern = location.map(like_pattern);

    let filter = r#"
        WHERE deadline > $1
          AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2)
          AND ($3::text IS NULL OR location ILIKE $3)
    "#;

    let select = format!(
        r#"
        SELECT id, title, description, requirements, location, deadline, recruiter_id, created_at
        FROM jobs
        {}
        ORDER BY {}
        LIMIT $4 OFFSET $5
        "#,
        filter,
        order_by(sort)
    );

    let jobs = sqlx::query_as::<_, Job>(&select)
        .bind(now)
        .bind(&query_pattern)
        .bind(&location_pattern)
        .bind(window.map(|w| w.limit))
        .bind(window.map(|w| w.offset).unwrap_or(0))
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Sqlx)?;

    let count = format!("SELECT COUNT(*) FROM jobs {}", filter);
    let total: i64 = sqlx::query_scalar(&count)
        .bind(now)
        .bind(&query_pattern)
        .bind(&location_pattern)
        .fetch_one(&mut *conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok((jobs, total))
}

/// Writes back the mutable fields of a job.
pub async fn update_job(conn: &mut DbConn, job: &Job) -> Result<Job> {
    let updated = sqlx::query_as::<_, Job>(
        r#"
        UPDATE jobs
        SET title = $1, description = $2, requirements = $3, location = $4, deadline = $5
        WHERE id = $6
        RETURNING id, title, description, requirements, location, deadline, recruiter_id, created_at
        "#,
    )
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.requirements)
    .bind(&job.location)
    .bind(job.deadline)
    .bind(job.id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    updated.ok_or_else(|| Error::NotFound("Job not found".to_string()))
}

/// Deletes a job by its ID.
pub async fn delete_job(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM jobs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
