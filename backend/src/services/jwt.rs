use crate::error::{Error, Result};
use crate::models::users::Role;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const INVALID_TOKEN: &str = "Invalid or expired token";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user_id as string
    pub sub: String,
    /// Role at the time the token was issued
    pub role: Role,
    /// Expiration time as Unix timestamp
    pub exp: i64,
    /// Issued at time as Unix timestamp
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| Error::InvalidToken(INVALID_TOKEN.to_string()))
    }
}

/// Signs an HS256 token for a user. Returns the token and its expiry.
///
/// # Example
/// ```rust,no_run
/// use jobboard::models::users::Role;
/// use jobboard::services::jwt::{generate_jwt, verify_jwt};
/// use uuid::Uuid;
///
/// let user_id = Uuid::now_v7();
/// let (token, _expires_at) = generate_jwt(user_id, Role::Recruiter, "my-secret", 7)?;
/// let claims = verify_jwt(&token, "my-secret")?;
/// assert_eq!(claims.user_id()?, user_id);
/// # Ok::<(), jobboard::error::Error>(())
/// ```
pub fn generate_jwt(
    user_id: Uuid,
    role: Role,
    secret: &str,
    expiration_days: i64,
) -> Result<(String, DateTime<Utc>)> {
    let now = Utc::now();
    let expiration = now + Duration::days(expiration_days);

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: expiration.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| Error::Internal(format!("Failed to generate JWT: {}", e)))?;

    Ok((token, expiration))
}

/// Verifies signature and expiry. Every failure collapses into one
/// `InvalidToken` error; the cause is only logged.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        Error::InvalidToken(INVALID_TOKEN.to_string())
    })?;

    Ok(token_data.claims)
}
