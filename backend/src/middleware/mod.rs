pub mod auth;
pub mod cors;

pub use auth::{authorize, jwt_auth_middleware, resume_auth_middleware, AuthenticatedUser};
pub use cors::cors_layer;
