use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::{
    config::DatabaseConfig,
    database::DbPool,
    error::{Error, Result},
    models::{
        analytics::ApplicationRollup,
        applications::{Application, ApplicationStatus, NewApplication, Resume},
        jobs::{Job, NewJob},
        pagination::Pagination,
        users::{NewUser, User, UserProfile},
    },
    queries::{self, jobs::Window},
};

use super::{JobBoardStore, JobSearch};

/// Postgres-backed store; every call acquires its own pooled connection.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connects to the configured database and applies embedded migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.connection_string().expose_secret())
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(host = %config.host, database = %config.database, "Connected to Postgres");

        Ok(Self::new(pool))
    }

    /// Underlying pool, for ad-hoc SQL such as test cleanup.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
        self.pool.acquire().await.map_err(|e| {
            Error::Internal(format!("Failed to acquire database connection: {}", e))
        })
    }
}

fn window(pagination: Pagination) -> Window {
    Window {
        limit: i64::from(pagination.page_size),
        offset: i64::try_from(pagination.offset()).unwrap_or(i64::MAX),
    }
}

fn count(total: i64) -> u64 {
    u64::try_from(total).unwrap_or_default()
}

#[async_trait]
impl JobBoardStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut conn = self.acquire().await?;
        queries::users::create_user(&mut conn, new_user).await
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let mut conn = self.acquire().await?;
        queries::users::get_user_by_id(&mut conn, id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = self.acquire().await?;
        queries::users::get_user_by_email(&mut conn, email).await
    }

    async fn get_profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>> {
        let mut conn = self.acquire().await?;
        queries::users::get_profiles_by_ids(&mut conn, ids).await
    }

    async fn update_user_name(&self, id: Uuid, name: &str) -> Result<Option<User>> {
        let mut conn = self.acquire().await?;
        queries::users::update_user_name(&mut conn, id, name).await
    }

    async fn create_job(&self, new_job: NewJob) -> Result<Job> {
        let mut conn = self.acquire().await?;
        queries::jobs::create_job(&mut conn, new_job).await
    }

    async fn get_job_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        let mut conn = self.acquire().await?;
        queries::jobs::get_job_by_id(&mut conn, id).await
    }

    async fn get_jobs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        let mut conn = self.acquire().await?;
        queries::jobs::get_jobs_by_ids(&mut conn, ids).await
    }

    async fn list_jobs_by_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Job>> {
        let mut conn = self.acquire().await?;
        queries::jobs::list_jobs_by_recruiter(&mut conn, recruiter_id).await
    }

    async fn search_open_jobs(
        &self,
        search: &JobSearch,
        now: DateTime<Utc>,
        pagination: Option<Pagination>,
    ) -> Result<(Vec<Job>, u64)> {
        let mut conn = self.acquire().await?;
        let (jobs, total) = queries::jobs::search_open_jobs(
            &mut conn,
            search.query.as_deref(),
            search.location.as_deref(),
            search.sort,
            now,
            pagination.map(window),
        )
        .await?;
        Ok((jobs, count(total)))
    }

    async fn update_job(&self, job: &Job) -> Result<Job> {
        let mut conn = self.acquire().await?;
        queries::jobs::update_job(&mut conn, job).await
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.acquire().await?;
        Ok(queries::jobs::delete_job(&mut conn, id).await? > 0)
    }

    async fn create_application(&self, new_application: NewApplication) -> Result<Application> {
        let mut conn = self.acquire().await?;
        queries::applications::create_application(&mut conn, new_application).await
    }

    async fn get_application_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let mut conn = self.acquire().await?;
        queries::applications::get_application_by_id(&mut conn, id).await
    }

    async fn get_application_for(&self, job_id: Uuid, applicant_id: Uuid) -> Result<Option<Application>> {
        let mut conn = self.acquire().await?;
        queries::applications::get_application_for_job_and_applicant(&mut conn, job_id, applicant_id).await
    }

    async fn list_applications_by_applicant(
        &self,
        applicant_id: Uuid,
        pagination: Pagination,
    ) -> Result<(Vec<Application>, u64)> {
        let mut conn = self.acquire().await?;
        let (applications, total) = queries::applications::list_applications_by_applicant(
            &mut conn,
            applicant_id,
            window(pagination),
        )
        .await?;
        Ok((applications, count(total)))
    }

    async fn list_applications_by_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>> {
        let mut conn = self.acquire().await?;
        queries::applications::list_applications_by_jobs(&mut conn, job_ids).await
    }

    async fn rollup_applications_by_jobs(&self, job_ids: &[Uuid]) -> Result<ApplicationRollup> {
        let mut conn = self.acquire().await?;
        queries::applications::rollup_applications_by_jobs(&mut conn, job_ids).await
    }

    async fn update_application_review(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<Application>> {
        let mut conn = self.acquire().await?;
        queries::applications::update_application_review(&mut conn, id, status, notes).await
    }

    async fn get_resume(&self, application_id: Uuid) -> Result<Option<Resume>> {
        let mut conn = self.acquire().await?;
        queries::applications::get_resume(&mut conn, application_id).await
    }

    async fn delete_applications_by_job(&self, job_id: Uuid) -> Result<u64> {
        let mut conn = self.acquire().await?;
        queries::applications::delete_applications_by_job(&mut conn, job_id).await
    }

    async fn delete_orphaned_applications(&self) -> Result<u64> {
        let mut conn = self.acquire().await?;
        queries::applications::delete_orphaned_applications(&mut conn).await
    }
}
