use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::Result,
    middleware::AuthenticatedUser,
    models::users::UpdateProfile,
    services::users,
    state::AppState,
};

/// GET /api/me
pub async fn get_me(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let user = users::get_profile(state.store.as_ref(), auth_user.id).await?;
    Ok(Json(serde_json::json!({ "user": user })))
}

/// PATCH /api/me
///
/// Updates the caller's display name. Email and role cannot be changed.
pub async fn update_me(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateProfile>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(update) = payload?;
    let user = users::update_profile(state.store.as_ref(), auth_user.id, update).await?;
    Ok(Json(serde_json::json!({ "user": user })))
}
