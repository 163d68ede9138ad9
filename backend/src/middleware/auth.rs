//! JWT authentication middleware and role checks
//!
//! The middleware verifies the bearer token and stores an [`AuthenticatedUser`]
//! in the request extensions. Handlers take `AuthenticatedUser` as an
//! extractor and narrow access further with [`AuthenticatedUser::require`].

use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::users::Role,
    services::{
        applications::Caller,
        cookies::{extract_jwt_token, TokenCarriers, TokenSource, DEFAULT_TOKEN_SOURCES, RESUME_TOKEN_SOURCES},
        jwt,
    },
    state::AppState,
};

/// Identity taken from a verified token
///
/// This struct is added to request extensions by the JWT middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier
    pub id: Uuid,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Fails with 403 unless the user holds one of `roles`.
    pub fn require(&self, roles: &[Role]) -> Result<&Self> {
        authorize(Some(self), roles)
    }

    pub fn caller(&self) -> Caller {
        Caller {
            id: self.id,
            role: self.role,
        }
    }
}

/// Role gate: 401 without an identity, 403 when the role is not permitted.
pub fn authorize<'a>(user: Option<&'a AuthenticatedUser>, roles: &[Role]) -> Result<&'a AuthenticatedUser> {
    let user = user.ok_or_else(|| Error::Authentication("Unauthorized".to_string()))?;

    if !roles.contains(&user.role) {
        tracing::warn!(user_id = %user.id, role = %user.role, "Rejected request: insufficient role");
        return Err(Error::Forbidden("Forbidden: Insufficient permissions".to_string()));
    }

    Ok(user)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = parts.extensions.get::<AuthenticatedUser>();
        authorize(user, &[Role::Applicant, Role::Recruiter]).copied()
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// JWT authentication middleware
///
/// # Token Sources
/// - **Authorization header** (API/Mobile clients): `Bearer <token>`
/// - **Cookie** (Browser clients): `token=<token>`
///
/// Returns 401 `No token provided` when no source carries a token and
/// 401 `Invalid or expired token` when verification fails.
///
/// # Usage
/// ```ignore
/// Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         jwt_auth_middleware,
///     ))
/// ```
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    authenticate(&state, DEFAULT_TOKEN_SOURCES, request, next).await
}

/// Like [`jwt_auth_middleware`], but also accepts `?token=<jwt>` so resume
/// links can be opened directly in a browser tab.
pub async fn resume_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    authenticate(&state, RESUME_TOKEN_SOURCES, request, next).await
}

async fn authenticate(
    state: &AppState,
    sources: &[TokenSource],
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let query_token = if sources.contains(&TokenSource::QueryParameter) {
        Query::<TokenQuery>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(query)| query.token)
    } else {
        None
    };

    let carriers = TokenCarriers {
        headers: request.headers(),
        cookie_name: &state.config.cookies.name,
        query_token: query_token.as_deref(),
    };
    let token = extract_jwt_token(sources, &carriers)?;

    let claims = jwt::verify_jwt(&token, state.config.jwt.secret.expose_secret())?;
    let user = AuthenticatedUser {
        id: claims.user_id()?,
        role: claims.role,
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
