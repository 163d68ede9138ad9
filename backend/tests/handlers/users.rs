//! Current user profile tests

use crate::common::{error_message, register_and_login, TestApp};

#[tokio::test]
async fn test_get_me_returns_profile_without_password() {
    let app = TestApp::new().await;
    let user = register_and_login(&app, "recruiter").await;

    let response = app
        .client
        .get(app.url("/api/me"))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["id"], user.id);
    assert_eq!(body["user"]["email"], user.email);
    assert_eq!(body["user"]["role"], "recruiter");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_update_me_changes_name_only() {
    let app = TestApp::new().await;
    let user = register_and_login(&app, "applicant").await;

    let response = app
        .client
        .patch(app.url("/api/me"))
        .bearer_auth(&user.token)
        .json(&serde_json::json!({ "name": "  Renamed Person  ", "role": "recruiter" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["name"], "Renamed Person");
    assert_eq!(body["user"]["role"], "applicant");
    assert_eq!(body["user"]["email"], user.email);
}

#[tokio::test]
async fn test_update_me_rejects_overlong_name() {
    let app = TestApp::new().await;
    let user = register_and_login(&app, "applicant").await;

    let response = app
        .client
        .patch(app.url("/api/me"))
        .bearer_auth(&user.token)
        .json(&serde_json::json!({ "name": "x".repeat(101) }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["details"]["name"].is_string());
}

#[tokio::test]
async fn test_get_me_for_vanished_account_returns_404() {
    let app = TestApp::new().await;
    let other = TestApp::new().await;
    let user = register_and_login(&other, "applicant").await;

    // Same signing secret, but this server's store never saw the account
    let response = app
        .client
        .get(app.url("/api/me"))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(error_message(response).await, "User not found");
}
