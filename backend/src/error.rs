use thiserror::Error;
use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

// Import Axum types for HTTP response conversion
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: BTreeMap<String, String> },
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Single {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field-to-message map used for the `details` member of the response.
    pub fn into_fields(self) -> BTreeMap<String, String> {
        match self {
            Self::Single { field, message } => BTreeMap::from([(field, message)]),
            Self::Multiple { fields } => fields,
        }
    }
}

/// Accumulates field errors so a handler can report all of them at once.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Records the error of a field check under `field`, keeping the first
    /// message per field. Multi-field errors keep their own keys.
    pub fn check(&mut self, field: &str, result: Result<()>) {
        match result {
            Err(Error::Validation(ValidationErrors::Single { message, .. })) => {
                self.add(field, message);
            }
            Err(Error::Validation(ValidationErrors::Multiple { fields })) => {
                for (key, message) in fields {
                    self.add(&key, message);
                }
            }
            _ => {}
        }
    }

    /// Like [`FieldErrors::check`], but hands back the validated value.
    pub fn take<T>(&mut self, field: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.check(field, Err(e));
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    pub fn into_error(self) -> Error {
        Error::Validation(ValidationErrors::Multiple {
            fields: self.fields,
        })
    }
}

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A migration failure at startup.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A validation error with field-level details.
    #[error("Validation error: {0:?}")]
    Validation(ValidationErrors),

    /// A malformed request that is not tied to a single field.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A not found error (resource does not exist).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A forbidden error (user lacks permission).
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// A conflict error (resource already exists).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An authentication error (missing or invalid credentials).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An invalid or expired token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Authentication(_) | Error::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Error::Sqlx(_) | Error::Migration(_) | Error::Internal(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for Error {
    fn from(error: MultipartError) -> Self {
        Error::BadRequest(error.body_text())
    }
}

/// Convert custom Error to HTTP response
///
/// Every variant renders as `{"error": <message>}`; validation failures add a
/// `details` object keyed by field. Server-side failures are logged and the
/// client only sees a generic message.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            Error::Validation(errors) => {
                serde_json::json!({
                    "error": "Validation error",
                    "details": errors.into_fields(),
                })
            }
            Error::BadRequest(msg)
            | Error::NotFound(msg)
            | Error::Forbidden(msg)
            | Error::Conflict(msg)
            | Error::Authentication(msg)
            | Error::InvalidToken(msg) => {
                serde_json::json!({ "error": msg })
            }
            internal @ (Error::Sqlx(_) | Error::Migration(_) | Error::Internal(_) | Error::Config(_)) => {
                tracing::error!(error = %internal, "Unhandled server error");
                serde_json::json!({ "error": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}
