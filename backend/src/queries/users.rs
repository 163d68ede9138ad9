use crate::{
    error::{Error, Result},
    models::users::{NewUser, User, UserProfile},
};
use uuid::Uuid;

use super::is_unique_violation;
use crate::DbConn;

/// Creates a new user in the database.
pub async fn create_user(conn: &mut DbConn, new_user: NewUser) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, password_hash, role, created_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(new_user.role)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        // users_email_lower_idx makes the check case-insensitive
        if is_unique_violation(&e) {
            Error::Conflict("User already exists with this email".to_string())
        } else {
            Error::Sqlx(e)
        }
    })?;

    Ok(user)
}

/// Gets a single user by their ID. The user may not exist.
pub async fn get_user_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, role, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets a single user by their email address, ignoring case. The user may not exist.
pub async fn get_user_by_email(conn: &mut DbConn, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, role, created_at
        FROM users
        WHERE lower(email) = lower($1)
        "#,
    )
    .bind(email)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Loads the public profiles of the given users.
pub async fn get_profiles_by_ids(conn: &mut DbConn, ids: &[Uuid]) -> Result<Vec<UserProfile>> {
    let profiles = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT id, name, email
        FROM users
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(profiles)
}

/// Updates a user's display name. Returns `None` if the user does not exist.
pub async fn update_user_name(conn: &mut DbConn, id: Uuid, name: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = $1
        WHERE id = $2
        RETURNING id, name, email, password_hash, role, created_at
        "#,
    )
    .bind(name)
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}
