//! Registration, login and session cookie tests

use crate::common::{
    error_message, generate_test_email, login, register, register_and_login, TestApp,
    TEST_PASSWORD,
};

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_returns_201_with_user() {
    let app = TestApp::new().await;
    let email = generate_test_email();

    let response = register(&app, "Dana Applicant", &email, "applicant").await;

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["user"]["id"].is_string());
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["role"], "applicant");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_register_stores_email_lowercased() {
    let app = TestApp::new().await;
    let email = generate_test_email();

    let response = register(&app, "Dana", &email.to_uppercase(), "recruiter").await;

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], email);
}

#[tokio::test]
async fn test_register_duplicate_email_in_any_case_returns_409() {
    let app = TestApp::new().await;
    let email = generate_test_email();

    let first = register(&app, "Dana", &email, "applicant").await;
    assert_eq!(first.status(), 201);

    let second = register(&app, "Dana Again", &email.to_uppercase(), "recruiter").await;
    assert_eq!(second.status(), 409);
    assert_eq!(error_message(second).await, "User already exists with this email");
}

#[tokio::test]
async fn test_register_reports_every_invalid_field() {
    let app = TestApp::new().await;

    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "name": "",
            "email": "not-an-email",
            "password": "123",
            "role": "admin",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation error");
    for field in ["name", "email", "password", "role"] {
        assert!(body["details"][field].is_string(), "missing detail for {field}");
    }
    assert_eq!(body["details"]["role"], "Role must be either applicant or recruiter");
}

#[tokio::test]
async fn test_register_malformed_json_returns_400() {
    let app = TestApp::new().await;

    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_returns_token_and_session_cookie() {
    let app = TestApp::new().await;
    let email = generate_test_email();
    register(&app, "Dana", &email, "applicant").await;

    let response = login(&app, &email, TEST_PASSWORD).await;

    assert_eq!(response.status(), 200);
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(!cookie.contains("Secure"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], email);
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let app = TestApp::new().await;
    let email = generate_test_email();
    register(&app, "Dana", &email, "applicant").await;

    let response = login(&app, &email.to_uppercase(), TEST_PASSWORD).await;

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_login_unknown_email_returns_404() {
    let app = TestApp::new().await;

    let response = login(&app, &generate_test_email(), TEST_PASSWORD).await;

    assert_eq!(response.status(), 404);
    assert_eq!(error_message(response).await, "User with this email does not exist");
}

#[tokio::test]
async fn test_login_wrong_password_returns_401() {
    let app = TestApp::new().await;
    let email = generate_test_email();
    register(&app, "Dana", &email, "applicant").await;

    let response = login(&app, &email, "wrong-password").await;

    assert_eq!(response.status(), 401);
    assert_eq!(error_message(response).await, "Invalid password");
}

// ============================================================================
// Token sources
// ============================================================================

#[tokio::test]
async fn test_session_cookie_authenticates_without_header() {
    let app = TestApp::new().await;
    let user = register_and_login(&app, "applicant").await;

    // The shared client kept the cookie from login
    let response = app.client.get(app.url("/api/me")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["id"], user.id);
}

#[tokio::test]
async fn test_bearer_header_takes_precedence_over_cookie() {
    let app = TestApp::new().await;
    let first = register_and_login(&app, "applicant").await;
    let second = register_and_login(&app, "recruiter").await;

    // Cookie now belongs to `second`
    let response = app
        .client
        .get(app.url("/api/me"))
        .bearer_auth(&first.token)
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["id"], first.id);
    assert_ne!(body["user"]["id"], second.id);
}

#[tokio::test]
async fn test_missing_token_returns_401() {
    let app = TestApp::new().await;

    let response = TestApp::new_client()
        .get(app.url("/api/me"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(error_message(response).await, "No token provided");
}

#[tokio::test]
async fn test_invalid_token_returns_401() {
    let app = TestApp::new().await;

    let response = TestApp::new_client()
        .get(app.url("/api/me"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(error_message(response).await, "Invalid or expired token");
}

#[tokio::test]
async fn test_query_token_is_ignored_outside_resume_route() {
    let app = TestApp::new().await;
    let user = register_and_login(&app, "applicant").await;

    let response = TestApp::new_client()
        .get(app.url(&format!("/api/me?token={}", user.token)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(error_message(response).await, "No token provided");
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    register_and_login(&app, "applicant").await;

    let response = app.client.post(app.url("/api/auth/logout")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Logged out successfully");

    let me = app.client.get(app.url("/api/me")).send().await.unwrap();
    assert_eq!(me.status(), 401);
}
