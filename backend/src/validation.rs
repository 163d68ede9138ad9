//! Input validation utilities for the service layer.
//!
//! Each validator reports a single field error; services collect them with
//! [`FieldErrors`](crate::error::FieldErrors) so a request gets every
//! problem back at once.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::error::{Error, Result, ValidationErrors};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_REQUIREMENTS_LEN: usize = 3000;
pub const MAX_LOCATION_LEN: usize = 100;
pub const MAX_CURRENT_ROLE_LEN: usize = 100;
pub const MAX_COVER_LETTER_LEN: usize = 3000;
pub const MAX_NOTES_LEN: usize = 2000;
pub const MAX_FILE_NAME_LEN: usize = 255;
pub const MAX_YEARS_OF_EXPERIENCE: i32 = 50;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[\d\s\-().]+$").expect("phone pattern is valid"));

fn invalid(field: &str, message: impl Into<String>) -> Error {
    Error::Validation(ValidationErrors::single(field, message))
}

/// Validates email format using structural checks
///
/// # Examples
/// ```
/// use jobboard::validation::validate_email;
///
/// validate_email("user@example.com").unwrap();
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(invalid("email", "Email is required"));
    }

    if email.len() > 254 {
        return Err(invalid("email", "Email address is too long (max 254 characters)"));
    }

    let Some((local_part, domain)) = email.split_once('@') else {
        return Err(invalid("email", "Invalid email format"));
    };

    if local_part.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid("email", "Invalid email format"));
    }

    if local_part.len() > 64 {
        return Err(invalid("email", "Invalid email format: local part is too long"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("email", "Invalid email format"));
    }

    if email.contains("..") {
        return Err(invalid("email", "Invalid email format"));
    }

    let invalid_chars = ['<', '>', '(', ')', '[', ']', '\\', ',', ';', ':', '"', ' '];
    if let Some(c) = invalid_chars.iter().find(|c| email.contains(**c)) {
        return Err(invalid("email", format!("Invalid email format: cannot contain '{}'", c)));
    }

    Ok(())
}

/// Lowercased, trimmed form under which emails are stored and compared.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();

    if len < MIN_PASSWORD_LEN {
        return Err(invalid(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    if len > MAX_PASSWORD_LEN {
        return Err(invalid(
            "password",
            format!("Password is too long (max {} characters)", MAX_PASSWORD_LEN),
        ));
    }

    Ok(())
}

/// Trims a required text field and checks its length in characters.
pub fn validate_required_string(input: &str, field: &str, label: &str, max: usize) -> Result<String> {
    let sanitized = sanitize_string(input);

    if sanitized.is_empty() {
        return Err(invalid(field, format!("{} is required", label)));
    }

    validate_max_length(&sanitized, field, label, max)?;
    Ok(sanitized)
}

pub fn validate_max_length(input: &str, field: &str, label: &str, max: usize) -> Result<()> {
    if input.chars().count() > max {
        return Err(invalid(
            field,
            format!("{} must be at most {} characters", label, max),
        ));
    }
    Ok(())
}

/// Trims an optional text field; blank values become `None`.
pub fn validate_optional_string(
    input: Option<&str>,
    field: &str,
    label: &str,
    max: usize,
) -> Result<Option<String>> {
    match input.map(sanitize_string).filter(|value| !value.is_empty()) {
        Some(value) => {
            validate_max_length(&value, field, label, max)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn validate_phone(phone: &str) -> Result<()> {
    if !PHONE_PATTERN.is_match(phone.trim()) {
        return Err(invalid("applicantPhone", "Invalid phone number format"));
    }
    Ok(())
}

pub fn validate_years_of_experience(raw: &str) -> Result<i32> {
    let years = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| invalid("yearsOfExperience", "Years of experience must be a whole number"))?;

    if !(0..=MAX_YEARS_OF_EXPERIENCE).contains(&years) {
        return Err(invalid(
            "yearsOfExperience",
            format!("Years of experience must be between 0 and {}", MAX_YEARS_OF_EXPERIENCE),
        ));
    }

    Ok(years)
}

/// Parses an RFC 3339 deadline that must lie strictly after `now`.
pub fn validate_future_deadline(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let deadline = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|_| invalid("deadline", "Deadline must be a valid ISO 8601 date-time"))?
        .with_timezone(&Utc);

    if deadline <= now {
        return Err(invalid("deadline", "Deadline must be in the future"));
    }

    Ok(deadline)
}

/// Parses a path or form identifier.
pub fn validate_uuid(uuid_str: &str) -> Result<Uuid> {
    Uuid::parse_str(uuid_str.trim()).map_err(|_| Error::BadRequest("Invalid ID format".to_string()))
}

pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}
