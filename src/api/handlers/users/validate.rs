//! Signup input rules.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::SignupRequest;
use crate::api::error::ApiError;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 150;
const PASSWORD_MAX: usize = 150;

// Words separated by single spaces.
static PERSON_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([A-Za-z']+ )+[A-Za-z']+$|^[A-Za-z']+$").ok());
static USERNAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([0-9A-Za-z]+ )+[0-9A-Za-z]+$|^[0-9A-Za-z]+$").ok());
static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Trimmed, validated signup fields.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct NewUser {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

fn fits(pattern: &Lazy<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

fn within(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

pub(crate) fn valid_person_name(name: &str) -> bool {
    within(name, NAME_MIN, NAME_MAX) && fits(&PERSON_NAME, name)
}

pub(crate) fn valid_username(username: &str) -> bool {
    within(username, NAME_MIN, NAME_MAX) && fits(&USERNAME, username)
}

pub(crate) fn valid_email(email: &str) -> bool {
    within(email, 1, EMAIL_MAX) && fits(&EMAIL, email)
}

/// # Errors
/// `BadRequest` naming the first field that fails its rule.
pub(crate) fn validate_signup(request: &SignupRequest) -> Result<NewUser, ApiError> {
    let first_name = request.first_name.trim();
    let last_name = request.last_name.trim();
    let username = request.username.trim();
    let email = request.email.trim();
    // Kept verbatim; login compares the untrimmed input.
    let password = request.password.as_str();

    if !valid_person_name(first_name) {
        return Err(ApiError::BadRequest("Invalid first name."));
    }
    if !valid_person_name(last_name) {
        return Err(ApiError::BadRequest("Invalid last name."));
    }
    if !valid_username(username) {
        return Err(ApiError::BadRequest("Invalid username."));
    }
    if !valid_email(email) {
        return Err(ApiError::BadRequest("Invalid email."));
    }
    if password.trim().is_empty() || !within(password, 1, PASSWORD_MAX) {
        return Err(ApiError::BadRequest("Invalid password."));
    }

    Ok(NewUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    })
}
