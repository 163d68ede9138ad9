//! Walks a job through its whole lifecycle using the service layer.
//!
//! Runs against the configured store; for a throwaway run use
//! `JOBBOARD__DATABASE__BACKEND=memory cargo run --example 01_hiring_flow`.

use chrono::{Duration, Utc};
use jobboard::{
    load_config,
    models::{
        applications::{ApplicationReview, ApplicationSubmission, ResumeUpload},
        jobs::{JobFilter, JobRequest},
        pagination::Pagination,
        users::{LoginUser, RegisterUser},
    },
    services::{analytics, applications, jobs, users},
    store,
};

const EXAMPLE_PREFIX: &str = "example_01_hiring_flow";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    println!("Loaded configuration:");
    println!("{}", config);
    println!();

    let store = store::connect(&config.database).await?;
    let store = store.as_ref();
    let run_id = Utc::now().timestamp_millis();

    println!("Registering a recruiter and an applicant...");
    let recruiter = users::register_user(
        store,
        RegisterUser {
            name: Some("Priya Recruiter".to_string()),
            email: Some(format!("{}_recruiter_{}@example.com", EXAMPLE_PREFIX, run_id)),
            password: Some("recruit123".to_string()),
            role: Some("recruiter".to_string()),
        },
    )
    .await?;
    let applicant_email = format!("{}_applicant_{}@example.com", EXAMPLE_PREFIX, run_id);
    let applicant = users::register_user(
        store,
        RegisterUser {
            name: Some("Dana Applicant".to_string()),
            email: Some(applicant_email.clone()),
            password: Some("apply1234".to_string()),
            role: Some("applicant".to_string()),
        },
    )
    .await?;
    println!("✓ {} ({}) and {} ({})", recruiter.name, recruiter.role, applicant.name, applicant.role);

    let session = users::login_user(
        store,
        LoginUser {
            email: Some(applicant_email.clone()),
            password: Some("apply1234".to_string()),
        },
        &config.jwt,
    )
    .await?;
    println!("✓ Applicant logged in, token expires at {}", session.expires_at);
    println!();

    println!("Posting a job...");
    let now = Utc::now();
    let job = jobs::create_job(
        store,
        recruiter.id,
        JobRequest {
            title: Some("Platform Engineer".to_string()),
            description: Some("Keep the hiring platform running".to_string()),
            requirements: Some("2-6 years of experience with Rust".to_string()),
            location: Some("Remote".to_string()),
            deadline: Some((now + Duration::days(14)).to_rfc3339()),
        },
        now,
    )
    .await?;
    println!("✓ Job {} open until {}", job.id, job.deadline);

    let filter = JobFilter {
        query: Some("platform".to_string()),
        experience: Some(4),
        ..JobFilter::default()
    };
    let page = jobs::list_open_jobs(store, &filter, Pagination::default(), Utc::now()).await?;
    println!("✓ Search for 'platform' with 4 years of experience: {} match(es)", page.total);
    println!();

    println!("Applying with a resume...");
    let application = applications::submit_application(
        store,
        applicant.id,
        ApplicationSubmission {
            job_id: Some(job.id.to_string()),
            applicant_name: Some(applicant.name.clone()),
            applicant_email: Some(applicant_email),
            applicant_phone: Some("+1 555 0100".to_string()),
            years_of_experience: Some("4".to_string()),
            current_role: Some("Site Reliability Engineer".to_string()),
            cover_letter: None,
            resume: Some(ResumeUpload {
                file_name: "dana.pdf".to_string(),
                content_type: Some(applications::PDF_CONTENT_TYPE.to_string()),
                content: bytes::Bytes::from_static(b"%PDF-1.7\n%%EOF\n"),
            }),
        },
        config.uploads.max_resume_bytes,
        Utc::now(),
    )
    .await?;
    println!("✓ Application {} is {}", application.application.id, application.application.status);

    let reviewed = applications::review_application(
        store,
        application.application.id,
        recruiter.id,
        ApplicationReview {
            status: Some("INTERVIEW".to_string()),
            notes: Some("Strong infrastructure background".to_string()),
        },
    )
    .await?;
    println!("✓ Recruiter moved it to {}", reviewed.application.status);
    println!();

    let summary = analytics::recruiter_summary(store, recruiter.id).await?;
    println!("Recruiter analytics:");
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!();

    jobs::delete_job(store, job.id, recruiter.id).await?;
    println!("✓ Job and its applications deleted");

    Ok(())
}
