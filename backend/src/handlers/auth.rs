use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use crate::{
    error::Result,
    models::users::{LoginUser, RegisterUser},
    services::{
        cookies::{build_session_cookie, clear_session_cookie},
        users,
    },
    state::AppState,
};

/// JSON response that also sets (or clears) the session cookie
pub struct SessionResponse {
    json_body: serde_json::Value,
    cookie: String,
}

impl IntoResponse for SessionResponse {
    fn into_response(self) -> Response {
        let (mut parts, body) = Json(self.json_body).into_response().into_parts();

        if let Ok(cookie) = HeaderValue::from_str(&self.cookie) {
            parts.headers.append(SET_COOKIE, cookie);
        }

        Response::from_parts(parts, body)
    }
}

/// POST /api/auth/register
///
/// Registers a new applicant or recruiter.
///
/// # Request Body
/// - `name`: Display name (max 100 characters)
/// - `email`: Email address (unique, case-insensitive)
/// - `password`: Password (minimum 6 characters)
/// - `role`: `applicant` or `recruiter`
///
/// # HTTP Status Codes
/// - `201 CREATED`: `{user}`
/// - `400 BAD_REQUEST`: Validation error with per-field `details`
/// - `409 CONFLICT`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterUser>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let Json(request) = payload?;

    let user = users::register_user(state.store.as_ref(), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "user": user
        })),
    ))
}

/// POST /api/auth/login
///
/// Authenticates a user with email and password.
///
/// Returns `{token, user}` and sets the `token` cookie (HttpOnly,
/// SameSite=Lax, 7 days). Browser clients rely on the cookie; API clients
/// send the token as `Authorization: Bearer <token>`.
///
/// # HTTP Status Codes
/// - `200 OK`: Authentication successful
/// - `400 BAD_REQUEST`: Validation error
/// - `401 UNAUTHORIZED`: Wrong password
/// - `404 NOT_FOUND`: No account with this email
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginUser>, JsonRejection>,
) -> Result<SessionResponse> {
    let Json(request) = payload?;

    let login_result = users::login_user(state.store.as_ref(), request, &state.config.jwt).await?;

    let max_age = state.config.jwt.expiration_days * 24 * 60 * 60;
    let cookie = build_session_cookie(&login_result.token, &state.config.cookies, max_age);

    Ok(SessionResponse {
        json_body: serde_json::json!({
            "token": login_result.token,
            "user": login_result.user,
        }),
        cookie,
    })
}

/// POST /api/auth/logout
///
/// Clears the session cookie. Tokens are stateless, so a copied bearer
/// token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> SessionResponse {
    SessionResponse {
        json_body: serde_json::json!({
            "message": "Logged out successfully"
        }),
        cookie: clear_session_cookie(&state.config.cookies),
    }
}
