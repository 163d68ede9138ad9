use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{
        analytics_summary, create_job, delete_job, download_resume, get_application, get_job,
        get_me, health_check, list_job_applications, list_jobs, list_my_applications,
        list_my_jobs, login, logout, register, review_application, submit_application,
        update_job, update_me,
    },
    middleware::{cors_layer, jwt_auth_middleware, resume_auth_middleware},
    state::AppState,
};

/// Headroom for the non-file form fields of an application.
const FORM_FIELDS_ALLOWANCE: usize = 1024 * 1024;

/// Builds the full HTTP surface, mounted under `/api`.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.uploads.max_resume_bytes + FORM_FIELDS_ALLOWANCE;

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/jobs", get(list_jobs))
        .route("/jobs/{id}", get(get_job));

    let protected_routes = Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/jobs", post(create_job))
        .route("/jobs/my-jobs", get(list_my_jobs))
        .route("/jobs/{id}", axum::routing::patch(update_job).delete(delete_job))
        .route("/jobs/{id}/applications", get(list_job_applications))
        .route(
            "/applications",
            post(submit_application).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/applications/me", get(list_my_applications))
        .route(
            "/applications/{id}",
            get(get_application).patch(review_application),
        )
        .route("/analytics/summary", get(analytics_summary))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let resume_routes = Router::new()
        .route("/applications/{id}/resume", get(download_resume))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resume_auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes).merge(resume_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors.allowed_origins))
        .with_state(state)
}
