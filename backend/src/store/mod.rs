//! Persistence port for users, jobs and applications.
//!
//! Services talk to a [`JobBoardStore`] only. The Postgres adapter delegates
//! to the `queries` module; the in-memory adapter backs local development and
//! the test suite. Both enforce the same uniqueness rules: one account per
//! email (case-insensitive) and one application per (job, applicant) pair.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::{DatabaseConfig, StoreBackend},
    error::Result,
    models::{
        analytics::ApplicationRollup,
        applications::{Application, ApplicationStatus, NewApplication, Resume},
        jobs::{Job, JobSort, NewJob},
        pagination::Pagination,
        users::{NewUser, User, UserProfile},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Text filters and ordering for open-job searches.
#[derive(Debug, Clone, Default)]
pub struct JobSearch {
    pub query: Option<String>,
    pub location: Option<String>,
    pub sort: JobSort,
}

#[async_trait]
pub trait JobBoardStore: Send + Sync {
    /// Inserts a user; a taken email yields `Error::Conflict`.
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>>;
    async fn update_user_name(&self, id: Uuid, name: &str) -> Result<Option<User>>;

    async fn create_job(&self, new_job: NewJob) -> Result<Job>;
    async fn get_job_by_id(&self, id: Uuid) -> Result<Option<Job>>;
    async fn get_jobs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>>;
    async fn list_jobs_by_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Job>>;
    /// Jobs with `deadline > now` matching `search`; the window limits the
    /// returned items while the count covers every match.
    async fn search_open_jobs(
        &self,
        search: &JobSearch,
        now: DateTime<Utc>,
        window: Option<Pagination>,
    ) -> Result<(Vec<Job>, u64)>;
    async fn update_job(&self, job: &Job) -> Result<Job>;
    async fn delete_job(&self, id: Uuid) -> Result<bool>;

    /// Inserts an application; a duplicate (job, applicant) pair yields `Error::Conflict`.
    async fn create_application(&self, new_application: NewApplication) -> Result<Application>;
    async fn get_application_by_id(&self, id: Uuid) -> Result<Option<Application>>;
    async fn get_application_for(&self, job_id: Uuid, applicant_id: Uuid) -> Result<Option<Application>>;
    async fn list_applications_by_applicant(
        &self,
        applicant_id: Uuid,
        pagination: Pagination,
    ) -> Result<(Vec<Application>, u64)>;
    /// Applications of the given jobs, newest first.
    async fn list_applications_by_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>>;
    async fn rollup_applications_by_jobs(&self, job_ids: &[Uuid]) -> Result<ApplicationRollup>;
    async fn update_application_review(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<Application>>;
    async fn get_resume(&self, application_id: Uuid) -> Result<Option<Resume>>;
    async fn delete_applications_by_job(&self, job_id: Uuid) -> Result<u64>;
    /// Removes applications whose job is gone. Safe to run repeatedly.
    async fn delete_orphaned_applications(&self) -> Result<u64>;
}

pub type DynStore = Arc<dyn JobBoardStore>;

/// Builds the configured store. Postgres connections run pending migrations first.
pub async fn connect(config: &DatabaseConfig) -> Result<DynStore> {
    match config.backend {
        StoreBackend::Postgres => Ok(Arc::new(PgStore::connect(config).await?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
