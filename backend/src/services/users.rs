use std::str::FromStr;

use argon2::Argon2;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    config::JwtConfig,
    error::{Error, FieldErrors, Result},
    models::users::{LoginResult, LoginUser, NewUser, RegisterUser, Role, UpdateProfile, User},
    services::jwt,
    store::JobBoardStore,
    validation::{
        normalize_email, validate_email, validate_password, validate_required_string, MAX_NAME_LEN,
    },
};

/// Registers a new user with validation and password hashing
pub async fn register_user(store: &dyn JobBoardStore, register_user: RegisterUser) -> Result<User> {
    let mut errors = FieldErrors::new();

    let name = register_user.name.unwrap_or_default();
    let name = errors.take("name", validate_required_string(&name, "name", "Name", MAX_NAME_LEN));

    let email = register_user.email.unwrap_or_default();
    errors.check("email", validate_email(&email));

    let password = register_user.password.unwrap_or_default();
    errors.check("password", validate_password(&password));

    let role = register_user.role.as_deref().and_then(|r| Role::from_str(r).ok());
    if role.is_none() {
        errors.add("role", "Role must be either applicant or recruiter");
    }

    let (name, role) = match (name, role) {
        (Some(name), Some(role)) if errors.is_empty() => (name, role),
        _ => return Err(errors.into_error()),
    };

    let password_hash = hash_password(password).await?;

    let new_user = NewUser {
        name,
        email: normalize_email(&email),
        password_hash,
        role,
    };

    let user = store.create_user(new_user).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok(user)
}

/// Authenticates a user by email and password and issues a session token
pub async fn login_user(
    store: &dyn JobBoardStore,
    login_user: LoginUser,
    jwt_config: &JwtConfig,
) -> Result<LoginResult> {
    let mut errors = FieldErrors::new();

    let email = login_user.email.unwrap_or_default();
    errors.check("email", validate_email(&email));

    let password = login_user.password.unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "Password is required");
    }

    errors.into_result()?;

    let user = store
        .get_user_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(|| Error::NotFound("User with this email does not exist".to_string()))?;

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
        return Err(Error::Authentication("Invalid password".to_string()));
    }

    let (token, expires_at) = jwt::generate_jwt(
        user.id,
        user.role,
        jwt_config.secret.expose_secret(),
        jwt_config.expiration_days,
    )?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(LoginResult {
        user,
        token,
        expires_at,
    })
}

/// Loads the caller's own account.
pub async fn get_profile(store: &dyn JobBoardStore, user_id: Uuid) -> Result<User> {
    store
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}

/// Applies a self-service profile update. Only the display name is mutable;
/// an absent name leaves the account unchanged.
pub async fn update_profile(
    store: &dyn JobBoardStore,
    user_id: Uuid,
    update: UpdateProfile,
) -> Result<User> {
    let Some(name) = update.name else {
        return get_profile(store, user_id).await;
    };

    let name = validate_required_string(&name, "name", "Name", MAX_NAME_LEN)?;

    store
        .update_user_name(user_id, &name)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}

/// Hashes a password with Argon2 on the blocking pool
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))?
}

async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal(format!("Password verification task failed: {}", e)))?
}

/// Verifies a password against a password hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!("Password verification failed: {}", e))),
    }
}
