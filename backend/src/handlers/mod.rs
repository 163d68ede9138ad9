pub mod analytics;
pub mod applications;
pub mod auth;
pub mod health;
pub mod jobs;
pub mod users;

pub use analytics::*;
pub use applications::*;
pub use auth::*;
pub use health::*;
pub use jobs::*;
pub use users::*;

use crate::error::Error;

/// Client mistakes are logged at warn, everything else at error.
pub(crate) fn log_handler_error(operation: &str, e: &Error) {
    match e {
        Error::Validation(_)
        | Error::BadRequest(_)
        | Error::NotFound(_)
        | Error::Forbidden(_)
        | Error::Conflict(_) => {
            tracing::warn!(operation = operation, error = %e, "Handler operation failed");
        }
        _ => {
            tracing::error!(operation = operation, error = %e, "Handler operation failed");
        }
    }
}
