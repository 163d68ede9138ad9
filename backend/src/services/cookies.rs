use axum::http::HeaderMap;
use axum_extra::headers::{authorization::Bearer, Authorization, Cookie, HeaderMapExt};

use crate::config::CookieConfig;
use crate::error::{Error, Result};

/// SameSite cookie attribute for CSRF protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Strict mode - cookie not sent with cross-site requests
    Strict,
    /// Lax mode - cookie sent with top-level navigations
    Lax,
    /// None mode - cookie sent with all requests (requires Secure)
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// A place a bearer token may be carried in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `Authorization: Bearer <token>` (API/mobile clients)
    AuthorizationHeader,
    /// Session cookie (browser clients)
    Cookie,
    /// `?token=<token>`, for links that cannot carry headers
    QueryParameter,
}

/// Lookup order for ordinary protected routes.
pub const DEFAULT_TOKEN_SOURCES: &[TokenSource] =
    &[TokenSource::AuthorizationHeader, TokenSource::Cookie];

/// Lookup order for resume downloads, which are opened as plain links.
pub const RESUME_TOKEN_SOURCES: &[TokenSource] = &[
    TokenSource::AuthorizationHeader,
    TokenSource::Cookie,
    TokenSource::QueryParameter,
];

/// Request parts a token may be read from.
#[derive(Debug, Clone, Copy)]
pub struct TokenCarriers<'a> {
    pub headers: &'a HeaderMap,
    pub cookie_name: &'a str,
    /// Already decoded `token` query parameter, if any
    pub query_token: Option<&'a str>,
}

impl TokenSource {
    pub fn extract(&self, carriers: &TokenCarriers<'_>) -> Option<String> {
        let token = match self {
            TokenSource::AuthorizationHeader => carriers
                .headers
                .typed_get::<Authorization<Bearer>>()
                .map(|auth| auth.token().to_string()),
            TokenSource::Cookie => carriers
                .headers
                .typed_get::<Cookie>()
                .and_then(|cookie| cookie.get(carriers.cookie_name).map(str::to_string)),
            TokenSource::QueryParameter => carriers.query_token.map(str::to_string),
        };
        token.filter(|token| !token.is_empty())
    }
}

/// Returns the first non-empty token found, trying `sources` in order.
///
/// # Example
/// ```rust,no_run
/// use axum::http::HeaderMap;
/// use jobboard::services::cookies::{extract_jwt_token, TokenCarriers, DEFAULT_TOKEN_SOURCES};
///
/// let mut headers = HeaderMap::new();
/// headers.insert("authorization", "Bearer eyJhbGc...".parse().unwrap());
/// let carriers = TokenCarriers { headers: &headers, cookie_name: "token", query_token: None };
/// let token = extract_jwt_token(DEFAULT_TOKEN_SOURCES, &carriers).unwrap();
/// ```
pub fn extract_jwt_token(sources: &[TokenSource], carriers: &TokenCarriers<'_>) -> Result<String> {
    sources
        .iter()
        .find_map(|source| source.extract(carriers))
        .ok_or_else(|| Error::Authentication("No token provided".to_string()))
}

/// Builds the Set-Cookie header value carrying the session token.
///
/// Returns e.g. `token=<jwt>; HttpOnly; SameSite=Lax; Path=/; Max-Age=604800`
pub fn build_session_cookie(token: &str, config: &CookieConfig, max_age_seconds: i64) -> String {
    format!(
        "{}={}; HttpOnly{}; SameSite={}; Path=/; Max-Age={}",
        config.name,
        token,
        if config.secure { "; Secure" } else { "" },
        config.same_site.as_str(),
        max_age_seconds
    )
}

/// Builds a Set-Cookie header value that expires the session cookie.
pub fn clear_session_cookie(config: &CookieConfig) -> String {
    format!(
        "{}=; HttpOnly{}; SameSite={}; Path=/; Max-Age=0",
        config.name,
        if config.secure { "; Secure" } else { "" },
        config.same_site.as_str()
    )
}
