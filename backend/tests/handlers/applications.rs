//! Application submission, review and resume download tests

use futures::future::join_all;
use serde_json::Value;
use uuid::Uuid;

use crate::common::{
    apply, application_form, create_job, error_message, pdf_part, register_and_login,
    submit_form, TestApp, TestAppOptions, TestUser, SAMPLE_PDF,
};

async fn get_application(app: &TestApp, user: &TestUser, id: &str) -> reqwest::Response {
    app.client
        .get(app.url(&format!("/api/applications/{}", id)))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap()
}

async fn review(app: &TestApp, user: &TestUser, id: &str, body: Value) -> reqwest::Response {
    app.client
        .patch(app.url(&format!("/api/applications/{}", id)))
        .bearer_auth(&user.token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

/// Recruiter, applicant and one open job
async fn setup(app: &TestApp) -> (TestUser, TestUser, String) {
    let recruiter = register_and_login(app, "recruiter").await;
    let applicant = register_and_login(app, "applicant").await;
    let job = create_job(app, &recruiter, "Backend Engineer", None).await;
    (recruiter, applicant, job["id"].as_str().unwrap().to_string())
}

// ============================================================================
// Submit
// ============================================================================

#[tokio::test]
async fn test_submit_application_returns_201() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;

    let application = apply(&app, &applicant, &job_id).await;

    assert_eq!(application["jobId"], job_id);
    assert_eq!(application["applicantId"], applicant.id);
    assert_eq!(application["status"], "APPLIED");
    assert_eq!(application["resumeFileName"], "resume.pdf");
    assert_eq!(application["yearsOfExperience"], 4);
    assert_eq!(application["job"]["title"], "Backend Engineer");
    assert!(application.get("resume").is_none());
    assert!(application.get("resumeData").is_none());
}

#[tokio::test]
async fn test_submit_without_resume_is_allowed() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;

    let form = application_form(&job_id, &applicant).text("coverLetter", "Hello there");
    let response = submit_form(&app, &applicant, form).await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert!(body["application"]["resumeFileName"].is_null());
    assert_eq!(body["application"]["coverLetter"], "Hello there");
}

#[tokio::test]
async fn test_recruiter_cannot_apply() {
    let app = TestApp::new().await;
    let (recruiter, _, job_id) = setup(&app).await;

    let response = submit_form(&app, &recruiter, application_form(&job_id, &recruiter)).await;

    assert_eq!(response.status(), 403);
    assert_eq!(error_message(response).await, "Forbidden: Insufficient permissions");
}

#[tokio::test]
async fn test_submit_with_missing_fields_returns_400() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;

    let form = reqwest::multipart::Form::new().text("jobId", job_id);
    let response = submit_form(&app, &applicant, form).await;

    assert_eq!(response.status(), 400);
    assert_eq!(error_message(response).await, "Missing required fields");
}

#[tokio::test]
async fn test_submit_to_unknown_job_returns_404() {
    let app = TestApp::new().await;
    let (_, applicant, _) = setup(&app).await;

    let form = application_form(&Uuid::now_v7().to_string(), &applicant);
    let response = submit_form(&app, &applicant, form).await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_submit_with_malformed_job_id_returns_400() {
    let app = TestApp::new().await;
    let (_, applicant, _) = setup(&app).await;

    let response = submit_form(&app, &applicant, application_form("job-42", &applicant)).await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_non_pdf_resume_is_rejected() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;

    let part = reqwest::multipart::Part::bytes(b"plain text".to_vec())
        .file_name("resume.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = application_form(&job_id, &applicant).part("resume", part);
    let response = submit_form(&app, &applicant, form).await;

    assert_eq!(response.status(), 400);
    assert_eq!(error_message(response).await, "Only PDF files are allowed");
}

#[tokio::test]
async fn test_oversized_resume_is_rejected() {
    let app = TestApp::with_options(TestAppOptions {
        max_resume_bytes: Some(1024 * 1024),
    })
    .await;
    let (_, applicant, job_id) = setup(&app).await;

    let oversized = vec![b'%'; 1024 * 1024 + 1];
    let form = application_form(&job_id, &applicant).part("resume", pdf_part("big.pdf", &oversized));
    let response = submit_form(&app, &applicant, form).await;

    assert_eq!(response.status(), 400);
    assert_eq!(error_message(response).await, "Resume must be 1MB or smaller");
}

#[tokio::test]
async fn test_duplicate_application_returns_409() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    apply(&app, &applicant, &job_id).await;

    let response = submit_form(&app, &applicant, application_form(&job_id, &applicant)).await;

    assert_eq!(response.status(), 409);
    assert_eq!(error_message(response).await, "You have already applied to this job");
}

#[tokio::test]
async fn test_concurrent_duplicate_submissions_create_one_application() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;

    let submissions = (0..8).map(|_| submit_form(&app, &applicant, application_form(&job_id, &applicant)));
    let statuses: Vec<u16> = join_all(submissions)
        .await
        .into_iter()
        .map(|response| response.status().as_u16())
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 7);
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_my_applications_are_paginated() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    let applicant = register_and_login(&app, "applicant").await;
    for title in ["First", "Second", "Third"] {
        let job = create_job(&app, &recruiter, title, None).await;
        apply(&app, &applicant, job["id"].as_str().unwrap()).await;
    }

    let response = app
        .client
        .get(app.url("/api/applications/me?page=1&pageSize=2"))
        .bearer_auth(&applicant.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 3);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["job"]["title"], "Third");
    assert_eq!(items[1]["job"]["title"], "Second");
}

#[tokio::test]
async fn test_applicant_cannot_view_others_application() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    let other = register_and_login(&app, "applicant").await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = get_application(&app, &other, application["id"].as_str().unwrap()).await;

    assert_eq!(response.status(), 403);
    assert_eq!(error_message(response).await, "You can only view your own applications");
}

#[tokio::test]
async fn test_other_recruiter_cannot_view_application() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    let other = register_and_login(&app, "recruiter").await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = get_application(&app, &other, application["id"].as_str().unwrap()).await;

    assert_eq!(response.status(), 403);
    assert_eq!(
        error_message(response).await,
        "You can only view applications for your own jobs"
    );
}

#[tokio::test]
async fn test_owning_recruiter_sees_applicant() {
    let app = TestApp::new().await;
    let (recruiter, applicant, job_id) = setup(&app).await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = get_application(&app, &recruiter, application["id"].as_str().unwrap()).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["application"]["applicant"]["id"], applicant.id);
    assert_eq!(body["application"]["job"]["id"], job_id);
}

#[tokio::test]
async fn test_get_unknown_application_returns_404() {
    let app = TestApp::new().await;
    let (_, applicant, _) = setup(&app).await;

    let response = get_application(&app, &applicant, &Uuid::now_v7().to_string()).await;

    assert_eq!(response.status(), 404);
    assert_eq!(error_message(response).await, "Application not found");
}

// ============================================================================
// Review
// ============================================================================

#[tokio::test]
async fn test_owner_reviews_application() {
    let app = TestApp::new().await;
    let (recruiter, applicant, job_id) = setup(&app).await;
    let application = apply(&app, &applicant, &job_id).await;
    let id = application["id"].as_str().unwrap();

    let response = review(
        &app,
        &recruiter,
        id,
        serde_json::json!({ "status": "UNDER_REVIEW", "notes": "Strong portfolio" }),
    )
    .await;
    assert_eq!(response.status(), 200);

    // Notes survive a status-only update
    let response = review(&app, &recruiter, id, serde_json::json!({ "status": "OFFER" })).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["application"]["status"], "OFFER");
    assert_eq!(body["application"]["notes"], "Strong portfolio");
    assert_eq!(body["application"]["applicantName"], applicant.name);
}

#[tokio::test]
async fn test_review_with_unknown_status_returns_400() {
    let app = TestApp::new().await;
    let (recruiter, applicant, job_id) = setup(&app).await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = review(
        &app,
        &recruiter,
        application["id"].as_str().unwrap(),
        serde_json::json!({ "status": "HIRED" }),
    )
    .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["details"]["status"].is_string());
}

#[tokio::test]
async fn test_other_recruiter_cannot_review() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    let other = register_and_login(&app, "recruiter").await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = review(
        &app,
        &other,
        application["id"].as_str().unwrap(),
        serde_json::json!({ "status": "REJECTED" }),
    )
    .await;

    assert_eq!(response.status(), 403);
    assert_eq!(
        error_message(response).await,
        "You can only update applications for your own jobs"
    );
}

#[tokio::test]
async fn test_applicant_cannot_review() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = review(
        &app,
        &applicant,
        application["id"].as_str().unwrap(),
        serde_json::json!({ "status": "OFFER" }),
    )
    .await;

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_job_applications_grouped_by_status() {
    let app = TestApp::new().await;
    let (recruiter, applicant, job_id) = setup(&app).await;
    let second = register_and_login(&app, "applicant").await;
    let first_application = apply(&app, &applicant, &job_id).await;
    apply(&app, &second, &job_id).await;
    review(
        &app,
        &recruiter,
        first_application["id"].as_str().unwrap(),
        serde_json::json!({ "status": "INTERVIEW" }),
    )
    .await;

    let response = app
        .client
        .get(app.url(&format!("/api/jobs/{}/applications", job_id)))
        .bearer_auth(&recruiter.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let by_status = body["byStatus"].as_object().unwrap();
    assert_eq!(by_status.len(), 5);
    assert_eq!(by_status["APPLIED"].as_array().unwrap().len(), 1);
    assert_eq!(by_status["INTERVIEW"].as_array().unwrap().len(), 1);
    assert_eq!(by_status["OFFER"].as_array().unwrap().len(), 0);
    assert_eq!(by_status["APPLIED"][0]["applicant"]["id"], second.id);
}

// ============================================================================
// Resume download
// ============================================================================

#[tokio::test]
async fn test_resume_round_trips_byte_identically() {
    let app = TestApp::new().await;
    let (recruiter, applicant, job_id) = setup(&app).await;
    let resume: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let form = application_form(&job_id, &applicant).part("resume", pdf_part("Dana CV.pdf", &resume));
    let response = submit_form(&app, &applicant, form).await;
    let body: Value = response.json().await.unwrap();
    let id = body["application"]["id"].as_str().unwrap().to_string();

    let response = app
        .client
        .get(app.url(&format!("/api/applications/{}/resume", id)))
        .bearer_auth(&recruiter.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"Dana CV.pdf\""
    );
    assert_eq!(response.bytes().await.unwrap().to_vec(), resume);
}

#[tokio::test]
async fn test_resume_accepts_query_token() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = TestApp::new_client()
        .get(app.url(&format!(
            "/api/applications/{}/resume?token={}",
            application["id"].as_str().unwrap(),
            applicant.token
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().as_ref(), SAMPLE_PDF);
}

#[tokio::test]
async fn test_resume_without_token_returns_401() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = TestApp::new_client()
        .get(app.url(&format!(
            "/api/applications/{}/resume",
            application["id"].as_str().unwrap()
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(error_message(response).await, "No token provided");
}

#[tokio::test]
async fn test_other_applicant_cannot_download_resume() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    let other = register_and_login(&app, "applicant").await;
    let application = apply(&app, &applicant, &job_id).await;

    let response = app
        .client
        .get(app.url(&format!(
            "/api/applications/{}/resume",
            application["id"].as_str().unwrap()
        )))
        .bearer_auth(&other.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    assert_eq!(error_message(response).await, "You can only view your own resume");
}

#[tokio::test]
async fn test_missing_resume_returns_404() {
    let app = TestApp::new().await;
    let (_, applicant, job_id) = setup(&app).await;
    let response = submit_form(&app, &applicant, application_form(&job_id, &applicant)).await;
    let body: Value = response.json().await.unwrap();

    let response = app
        .client
        .get(app.url(&format!(
            "/api/applications/{}/resume",
            body["application"]["id"].as_str().unwrap()
        )))
        .bearer_auth(&applicant.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(error_message(response).await, "No resume found for this application");
}
