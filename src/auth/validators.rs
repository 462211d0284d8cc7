// src/auth/validators.rs

use regex::Regex;
use std::sync::OnceLock;

use super::models::{ProfileChanges, SignupRequest};
use super::password::MAX_PASSWORD_BYTES;
use crate::common::{ValidationResult, Validator};

const MIN_PASSWORD_CHARS: usize = 4;
const MAX_FIELD_LEN: usize = 255;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

fn username_regex() -> &'static Regex {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    USERNAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{3,30}$").expect("valid username regex"))
}

fn validate_name(result: &mut ValidationResult, field: &str, value: &str) {
    if value.trim().is_empty() {
        result.add_error(field, "is required");
    } else if value.len() > MAX_FIELD_LEN {
        result.add_error(field, "must be less than 255 characters");
    }
}

fn validate_username(result: &mut ValidationResult, username: &str) {
    if !username_regex().is_match(username) {
        result.add_error(
            "username",
            "must be 3-30 characters of letters, digits or underscore",
        );
    }
}

fn validate_profile_image(result: &mut ValidationResult, profile_image: &str) {
    if profile_image.len() > MAX_FIELD_LEN {
        result.add_error("profile_image", "must be less than 255 characters");
    }
}

// ============================================================================
// Signup
// ============================================================================

pub struct SignupValidator;

impl Validator<SignupRequest> for SignupValidator {
    fn validate(&self, data: &SignupRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let email = data.email.trim();
        if email.is_empty() {
            result.add_error("email", "is required");
        } else if email.len() > MAX_FIELD_LEN || !email_regex().is_match(email) {
            result.add_error("email", "must be a valid email address");
        }

        if data.password.chars().count() < MIN_PASSWORD_CHARS {
            result.add_error("password", "must be at least 4 characters");
        } else if data.password.len() > MAX_PASSWORD_BYTES {
            result.add_error("password", "must be at most 72 bytes");
        }

        validate_name(&mut result, "first_name", &data.first_name);
        validate_name(&mut result, "last_name", &data.last_name);

        if let Some(username) = &data.username {
            validate_username(&mut result, username);
        }
        if let Some(profile_image) = &data.profile_image {
            validate_profile_image(&mut result, profile_image);
        }

        result
    }
}

// ============================================================================
// Profile update
// ============================================================================

pub struct ProfileChangesValidator;

impl Validator<ProfileChanges> for ProfileChangesValidator {
    fn validate(&self, data: &ProfileChanges) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.first_name.is_none()
            && data.last_name.is_none()
            && data.username.is_none()
            && data.profile_image.is_none()
        {
            result.add_error("general", "At least one field must be provided for update");
            return result;
        }

        if let Some(first_name) = &data.first_name {
            validate_name(&mut result, "first_name", first_name);
        }
        if let Some(last_name) = &data.last_name {
            validate_name(&mut result, "last_name", last_name);
        }
        if let Some(username) = &data.username {
            validate_username(&mut result, username);
        }
        if let Some(profile_image) = &data.profile_image {
            validate_profile_image(&mut result, profile_image);
        }

        result
    }
}
