use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::{
        analytics::{ApplicationRollup, JobRollup},
        applications::{Application, ApplicationStatus, NewApplication, Resume},
        jobs::{Job, JobSort, NewJob},
        pagination::Pagination,
        users::{NewUser, User, UserProfile},
    },
};

use super::{JobBoardStore, JobSearch};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// lowercased email -> user id
    emails: HashMap<String, Uuid>,
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    resumes: HashMap<Uuid, Resume>,
}

/// Process-local store. Every write holds the table lock for its whole
/// check-then-insert, so uniqueness holds under concurrent requests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_search(job: &Job, search: &JobSearch) -> bool {
    let query_matches = search.query.as_deref().is_none_or(|q| {
        contains_ignore_case(&job.title, q) || contains_ignore_case(&job.description, q)
    });
    let location_matches = search.location.as_deref().is_none_or(|loc| {
        job.location
            .as_deref()
            .is_some_and(|location| contains_ignore_case(location, loc))
    });
    query_matches && location_matches
}

fn sort_jobs(jobs: &mut [Job], sort: JobSort) {
    match sort {
        JobSort::CreatedAtDesc => jobs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id))),
        JobSort::CreatedAtAsc => jobs.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id))),
        JobSort::TitleAsc => jobs.sort_by_cached_key(|job| (job.title.to_lowercase(), job.id)),
        JobSort::TitleDesc => {
            jobs.sort_by_cached_key(|job| std::cmp::Reverse((job.title.to_lowercase(), job.id)))
        }
    }
}

/// Same aggregates the Postgres adapter computes with `GROUP BY`.
fn rollup<'a>(applications: impl Iterator<Item = &'a Application>) -> ApplicationRollup {
    let mut applicants = HashSet::new();
    let mut status_counts: IndexMap<ApplicationStatus, i64> = IndexMap::new();
    let mut per_job: IndexMap<Uuid, (i64, i64, i32, i32)> = IndexMap::new();

    for application in applications {
        applicants.insert(application.applicant_id);
        *status_counts.entry(application.status).or_default() += 1;

        let years = application.years_of_experience;
        let (count, sum, min, max) = per_job
            .entry(application.job_id)
            .or_insert((0, 0, years, years));
        *count += 1;
        *sum += i64::from(years);
        *min = (*min).min(years);
        *max = (*max).max(years);
    }

    ApplicationRollup {
        distinct_applicants: applicants.len() as i64,
        status_counts: status_counts.into_iter().collect(),
        per_job: per_job
            .into_iter()
            .map(|(job_id, (count, sum, min, max))| JobRollup {
                job_id,
                count,
                avg_experience: sum as f64 / count as f64,
                min_experience: min,
                max_experience: max,
            })
            .collect(),
    }
}

fn newest_first(applications: &mut [Application]) {
    applications.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

#[async_trait]
impl JobBoardStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        let key = new_user.email.to_lowercase();
        if tables.emails.contains_key(&key) {
            return Err(Error::Conflict("User already exists with this email".to_string()));
        }

        let user = User {
            id: Uuid::now_v7(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: Utc::now(),
        };
        tables.emails.insert(key, user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .emails
            .get(&email.to_lowercase())
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn get_profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .map(UserProfile::from)
            .collect())
    }

    async fn update_user_name(&self, id: Uuid, name: &str) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.name = name.to_string();
            user.clone()
        }))
    }

    async fn create_job(&self, new_job: NewJob) -> Result<Job> {
        let job = Job {
            id: Uuid::now_v7(),
            title: new_job.title,
            description: new_job.description,
            requirements: new_job.requirements,
            location: new_job.location,
            deadline: new_job.deadline,
            recruiter_id: new_job.recruiter_id,
            created_at: Utc::now(),
        };
        self.tables.write().await.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn get_job_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.tables.read().await.jobs.get(&id).cloned())
    }

    async fn get_jobs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.jobs.get(id)).cloned().collect())
    }

    async fn list_jobs_by_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Job>> {
        let tables = self.tables.read().await;
        let mut jobs: Vec<Job> = tables
            .jobs
            .values()
            .filter(|job| job.recruiter_id == recruiter_id)
            .cloned()
            .collect();
        sort_jobs(&mut jobs, JobSort::CreatedAtDesc);
        Ok(jobs)
    }

    async fn search_open_jobs(
        &self,
        search: &JobSearch,
        now: DateTime<Utc>,
        window: Option<Pagination>,
    ) -> Result<(Vec<Job>, u64)> {
        let tables = self.tables.read().await;
        let mut jobs: Vec<Job> = tables
            .jobs
            .values()
            .filter(|job| job.is_open_at(now) && matches_search(job, search))
            .cloned()
            .collect();
        sort_jobs(&mut jobs, search.sort);

        let total = jobs.len() as u64;
        let jobs = match window {
            Some(pagination) => pagination.slice(jobs),
            None => jobs,
        };
        Ok((jobs, total))
    }

    async fn update_job(&self, job: &Job) -> Result<Job> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .jobs
            .get_mut(&job.id)
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;

        stored.title = job.title.clone();
        stored.description = job.description.clone();
        stored.requirements = job.requirements.clone();
        stored.location = job.location.clone();
        stored.deadline = job.deadline;
        Ok(stored.clone())
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.jobs.remove(&id).is_some())
    }

    async fn create_application(&self, new_application: NewApplication) -> Result<Application> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.applications.values().any(|existing| {
            existing.job_id == new_application.job_id
                && existing.applicant_id == new_application.applicant_id
        });
        if duplicate {
            return Err(Error::Conflict("You have already applied to this job".to_string()));
        }

        let now = Utc::now();
        let application = Application {
            id: Uuid::now_v7(),
            job_id: new_application.job_id,
            applicant_id: new_application.applicant_id,
            status: ApplicationStatus::Applied,
            applicant_name: new_application.applicant_name,
            applicant_email: new_application.applicant_email,
            applicant_phone: new_application.applicant_phone,
            years_of_experience: new_application.years_of_experience,
            current_role: new_application.current_role,
            cover_letter: new_application.cover_letter,
            notes: None,
            resume_file_name: new_application.resume.as_ref().map(|r| r.file_name.clone()),
            created_at: now,
            updated_at: now,
        };

        if let Some(resume) = new_application.resume {
            tables.resumes.insert(application.id, resume);
        }
        tables.applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn get_application_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(self.tables.read().await.applications.get(&id).cloned())
    }

    async fn get_application_for(&self, job_id: Uuid, applicant_id: Uuid) -> Result<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .values()
            .find(|a| a.job_id == job_id && a.applicant_id == applicant_id)
            .cloned())
    }

    async fn list_applications_by_applicant(
        &self,
        applicant_id: Uuid,
        pagination: Pagination,
    ) -> Result<(Vec<Application>, u64)> {
        let tables = self.tables.read().await;
        let mut applications: Vec<Application> = tables
            .applications
            .values()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect();
        newest_first(&mut applications);

        let total = applications.len() as u64;
        Ok((pagination.slice(applications), total))
    }

    async fn list_applications_by_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>> {
        let tables = self.tables.read().await;
        let mut applications: Vec<Application> = tables
            .applications
            .values()
            .filter(|a| job_ids.contains(&a.job_id))
            .cloned()
            .collect();
        newest_first(&mut applications);
        Ok(applications)
    }

    async fn rollup_applications_by_jobs(&self, job_ids: &[Uuid]) -> Result<ApplicationRollup> {
        let tables = self.tables.read().await;
        Ok(rollup(
            tables
                .applications
                .values()
                .filter(|a| job_ids.contains(&a.job_id)),
        ))
    }

    async fn update_application_review(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<Application>> {
        let mut tables = self.tables.write().await;
        Ok(tables.applications.get_mut(&id).map(|application| {
            application.status = status;
            application.notes = notes.map(str::to_string);
            application.updated_at = Utc::now();
            application.clone()
        }))
    }

    async fn get_resume(&self, application_id: Uuid) -> Result<Option<Resume>> {
        Ok(self.tables.read().await.resumes.get(&application_id).cloned())
    }

    async fn delete_applications_by_job(&self, job_id: Uuid) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let doomed: Vec<Uuid> = tables
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .map(|a| a.id)
            .collect();
        for id in &doomed {
            tables.applications.remove(id);
            tables.resumes.remove(id);
        }
        Ok(doomed.len() as u64)
    }

    async fn delete_orphaned_applications(&self) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let orphans: Vec<Uuid> = tables
            .applications
            .values()
            .filter(|a| !tables.jobs.contains_key(&a.job_id))
            .map(|a| a.id)
            .collect();
        for id in &orphans {
            tables.applications.remove(id);
            tables.resumes.remove(id);
        }
        Ok(orphans.len() as u64)
    }
}
