//! Job posting endpoint tests

use chrono::{Duration, Utc};
use jobboard::{models::jobs::NewJob, JobBoardStore};
use serde_json::Value;
use uuid::Uuid;

use crate::common::{
    apply, create_job, create_job_with, deadline_in_days, error_message, register_and_login,
    TestApp, TestUser,
};

/// Inserts a job whose deadline already passed, bypassing API validation.
async fn seed_expired_job(app: &TestApp, recruiter: &TestUser, title: &str) -> Uuid {
    let job = app
        .store
        .create_job(NewJob {
            title: title.to_string(),
            description: "Closed posting".to_string(),
            requirements: None,
            location: Some("Remote".to_string()),
            deadline: Utc::now() - Duration::days(1),
            recruiter_id: Uuid::parse_str(&recruiter.id).unwrap(),
        })
        .await
        .unwrap();
    job.id
}

async fn list(app: &TestApp, query: &str) -> Value {
    let response = app
        .client
        .get(app.url(&format!("/api/jobs{}", query)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

fn titles(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["title"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_recruiter_creates_job() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;

    let job = create_job(&app, &recruiter, "Backend Engineer", Some("3+ years of Rust")).await;

    assert!(job["id"].is_string());
    assert_eq!(job["title"], "Backend Engineer");
    assert_eq!(job["recruiterId"], recruiter.id);
    assert_eq!(job["requirements"], "3+ years of Rust");
}

#[tokio::test]
async fn test_applicant_cannot_create_job() {
    let app = TestApp::new().await;
    let applicant = register_and_login(&app, "applicant").await;

    let response = create_job_with(
        &app,
        &applicant,
        serde_json::json!({
            "title": "Sneaky",
            "description": "Should not exist",
            "deadline": deadline_in_days(5),
        }),
    )
    .await;

    assert_eq!(response.status(), 403);
    assert_eq!(error_message(response).await, "Forbidden: Insufficient permissions");
}

#[tokio::test]
async fn test_create_job_with_past_deadline_returns_400() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;

    let response = create_job_with(
        &app,
        &recruiter,
        serde_json::json!({
            "title": "Late",
            "description": "Too late",
            "deadline": deadline_in_days(-1),
        }),
    )
    .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["details"]["deadline"].is_string());
}

#[tokio::test]
async fn test_create_job_reports_missing_fields() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;

    let response = create_job_with(&app, &recruiter, serde_json::json!({})).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    for field in ["title", "description", "deadline"] {
        assert!(body["details"][field].is_string(), "missing detail for {field}");
    }
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_listing_excludes_expired_jobs() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    create_job(&app, &recruiter, "Open Role", None).await;
    seed_expired_job(&app, &recruiter, "Closed Role").await;

    let page = list(&app, "").await;

    assert_eq!(titles(&page), vec!["Open Role"]);
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 10);
}

#[tokio::test]
async fn test_listing_is_public() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    create_job(&app, &recruiter, "Open Role", None).await;

    let response = TestApp::new_client()
        .get(app.url("/api/jobs"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_listing_search_and_sort() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    create_job(&app, &recruiter, "Rust Engineer", None).await;
    create_job(&app, &recruiter, "Go Engineer", None).await;
    create_job(&app, &recruiter, "Product Designer", None).await;

    let page = list(&app, "?q=engineer&sort=title:asc").await;

    assert_eq!(titles(&page), vec!["Go Engineer", "Rust Engineer"]);
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn test_listing_defaults_to_newest_first() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    create_job(&app, &recruiter, "First", None).await;
    create_job(&app, &recruiter, "Second", None).await;

    let page = list(&app, "").await;

    assert_eq!(titles(&page), vec!["Second", "First"]);
}

#[tokio::test]
async fn test_listing_pagination_window() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    for i in 0..5 {
        create_job(&app, &recruiter, &format!("Job {}", i), None).await;
    }

    let page = list(&app, "?page=2&pageSize=2&sort=title:asc").await;

    assert_eq!(titles(&page), vec!["Job 2", "Job 3"]);
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 2);
    assert_eq!(page["pageSize"], 2);
}

#[tokio::test]
async fn test_listing_rejects_bad_pagination() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/api/jobs?page=0&pageSize=abc"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["details"]["page"].is_string());
    assert!(body["details"]["pageSize"].is_string());
}

#[tokio::test]
async fn test_listing_experience_filter() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    create_job(&app, &recruiter, "Junior", Some("1-2 years of experience")).await;
    create_job(&app, &recruiter, "Senior", Some("5+ years with distributed systems")).await;
    create_job(&app, &recruiter, "Anyone", Some("Curiosity")).await;

    let page = list(&app, "?experience=6&sort=title:asc").await;

    assert_eq!(titles(&page), vec!["Anyone", "Senior"]);
    assert_eq!(page["total"], 2);
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_get_job_includes_recruiter() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    let job = create_job(&app, &recruiter, "Backend Engineer", None).await;

    let response = TestApp::new_client()
        .get(app.url(&format!("/api/jobs/{}", job["id"].as_str().unwrap())))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["job"]["title"], "Backend Engineer");
    assert_eq!(body["job"]["recruiter"]["id"], recruiter.id);
    assert_eq!(body["job"]["recruiter"]["email"], recruiter.email);
}

#[tokio::test]
async fn test_get_job_with_malformed_id_returns_400() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/api/jobs/not-a-uuid")).send().await.unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(error_message(response).await, "Invalid ID format");
}

#[tokio::test]
async fn test_get_unknown_job_returns_404() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url(&format!("/api/jobs/{}", Uuid::now_v7())))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_my_jobs_includes_expired() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    let other = register_and_login(&app, "recruiter").await;
    create_job(&app, &recruiter, "Open Role", None).await;
    seed_expired_job(&app, &recruiter, "Closed Role").await;
    create_job(&app, &other, "Someone Else's Role", None).await;

    let response = app
        .client
        .get(app.url("/api/jobs/my-jobs"))
        .bearer_auth(&recruiter.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let mut mine = titles(&body);
    mine.sort();
    assert_eq!(mine, vec!["Closed Role", "Open Role"]);
}

// ============================================================================
// Update / delete
// ============================================================================

#[tokio::test]
async fn test_owner_updates_job() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    let job = create_job(&app, &recruiter, "Backend Engineer", Some("Rust")).await;

    let response = app
        .client
        .patch(app.url(&format!("/api/jobs/{}", job["id"].as_str().unwrap())))
        .bearer_auth(&recruiter.token)
        .json(&serde_json::json!({ "title": "Staff Engineer", "requirements": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["job"]["title"], "Staff Engineer");
    assert_eq!(body["job"]["description"], job["description"]);
    assert!(body["job"]["requirements"].is_null());
}

#[tokio::test]
async fn test_other_recruiter_cannot_update_job() {
    let app = TestApp::new().await;
    let owner = register_and_login(&app, "recruiter").await;
    let intruder = register_and_login(&app, "recruiter").await;
    let job = create_job(&app, &owner, "Backend Engineer", None).await;

    let response = app
        .client
        .patch(app.url(&format!("/api/jobs/{}", job["id"].as_str().unwrap())))
        .bearer_auth(&intruder.token)
        .json(&serde_json::json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    assert_eq!(error_message(response).await, "You can only update your own jobs");
}

#[tokio::test]
async fn test_other_recruiter_cannot_delete_job() {
    let app = TestApp::new().await;
    let owner = register_and_login(&app, "recruiter").await;
    let intruder = register_and_login(&app, "recruiter").await;
    let job = create_job(&app, &owner, "Backend Engineer", None).await;

    let response = app
        .client
        .delete(app.url(&format!("/api/jobs/{}", job["id"].as_str().unwrap())))
        .bearer_auth(&intruder.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    assert_eq!(error_message(response).await, "You can only delete your own jobs");
}

#[tokio::test]
async fn test_delete_job_cascades_to_applications() {
    let app = TestApp::new().await;
    let recruiter = register_and_login(&app, "recruiter").await;
    let applicant = register_and_login(&app, "applicant").await;
    let job = create_job(&app, &recruiter, "Backend Engineer", None).await;
    let job_id = job["id"].as_str().unwrap();
    let application = apply(&app, &applicant, job_id).await;

    let response = app
        .client
        .delete(app.url(&format!("/api/jobs/{}", job_id)))
        .bearer_auth(&recruiter.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let job_response = app
        .client
        .get(app.url(&format!("/api/jobs/{}", job_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(job_response.status(), 404);

    let application_response = app
        .client
        .get(app.url(&format!(
            "/api/applications/{}",
            application["id"].as_str().unwrap()
        )))
        .bearer_auth(&applicant.token)
        .send()
        .await
        .unwrap();
    assert_eq!(application_response.status(), 404);
}
