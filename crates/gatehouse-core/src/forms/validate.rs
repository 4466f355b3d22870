//! Client-side shape checks shared by the auth forms.
//!
//! These only catch obviously malformed input before a request is made.
//! Uniqueness, token expiry and password policy are the API's call.

use std::sync::OnceLock;

use regex::Regex;

use super::{Field, FieldErrors};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_NAME_LENGTH: usize = 2;

pub const INVALID_EMAIL: &str = "Invalid email format.";
pub const SHORT_PASSWORD: &str = "Password must be at least 6 characters.";
pub const SHORT_NAME: &str = "Name must be at least 2 characters.";
pub const PASSWORD_MISMATCH: &str = "Passwords don't match";

/// Local part, `@`, dot-separated labels, alphabetic TLD of two or more.
const EMAIL_PATTERN: &str =
    r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    if email.starts_with('.') || email.contains("..") {
        return false;
    }
    email_regex().is_some_and(|re| re.is_match(email))
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email) {
        errors.push(Field::Email, INVALID_EMAIL);
    }
}

pub fn check_password(errors: &mut FieldErrors, field: Field, password: &str) {
    if char_len(password) < MIN_PASSWORD_LENGTH {
        errors.push(field, SHORT_PASSWORD);
    }
}

pub fn check_name(errors: &mut FieldErrors, name: &str) {
    if char_len(name) < MIN_NAME_LENGTH {
        errors.push(Field::Name, SHORT_NAME);
    }
}

/// Mismatch is reported on the confirmation field.
pub fn check_confirmation(errors: &mut FieldErrors, password: &str, confirm: &str) {
    if password != confirm {
        errors.push(Field::Confirm, PASSWORD_MISMATCH);
    }
}
