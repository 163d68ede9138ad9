use axum::{extract::State, Json};

use crate::{
    error::Result,
    middleware::AuthenticatedUser,
    models::{analytics::AnalyticsSummary, users::Role},
    services::analytics,
    state::AppState,
};

use super::log_handler_error;

/// GET /api/analytics/summary
///
/// Hiring funnel over the caller's jobs.
pub async fn analytics_summary(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Json<AnalyticsSummary>> {
    auth_user.require(&[Role::Recruiter])?;

    let summary = analytics::recruiter_summary(state.store.as_ref(), auth_user.id)
        .await
        .inspect_err(|e| log_handler_error("analytics_summary", e))?;

    Ok(Json(summary))
}
