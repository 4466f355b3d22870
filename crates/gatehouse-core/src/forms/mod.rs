//! Auth forms.
//!
//! Each form validates its input locally, issues a single API call and
//! either updates the session store or produces a message to show. A form
//! never sends a request when validation fails.
//!
//! Submissions carry a [`ViewScope`](crate::auth::ViewScope). If the view
//! was left while the request was in flight the result is dropped and
//! [`FormError::Stale`] is returned instead.

pub mod confirm_account;
pub mod create_account;
pub mod forgot_password;
pub mod login;
pub mod new_password;
pub mod register;
pub mod validate;

use std::fmt;

use thiserror::Error;

use crate::api::ApiError;
use crate::routes::Route;

pub use confirm_account::confirm_account;
pub use create_account::CreateAccountForm;
pub use forgot_password::ForgotPasswordForm;
pub use login::LoginForm;
pub use new_password::{check_reset_token, NewPasswordForm, ResetTokenStatus};
pub use register::RegisterForm;

/// Maximum length for name and email input.
pub const MAX_TEXT_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    Confirm,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::Confirm => "Repeat password",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Name => "Enter your name",
            Field::Email => "Enter your email",
            Field::Password | Field::Confirm => "Enter your password",
        }
    }

    /// Masked when rendered.
    pub fn is_secret(&self) -> bool {
        matches!(self, Field::Password | Field::Confirm)
    }

    pub fn max_len(&self) -> usize {
        if self.is_secret() {
            MAX_PASSWORD_LENGTH
        } else {
            MAX_TEXT_LENGTH
        }
    }

    /// Whether `c` may be typed into this field holding `current_len` chars.
    pub fn accepts(&self, current_len: usize, c: char) -> bool {
        current_len < self.max_len() && !c.is_control()
    }
}

/// Per-field validation messages; at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(Field, &'static str)>,
}

impl FieldErrors {
    /// Record `message` unless `field` already has one.
    pub fn push(&mut self, field: Field, message: &'static str) {
        if self.get(field).is_none() {
            self.errors.push((field, message));
        }
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().copied()
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field.label(), message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message shown above a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// What a successful submission asks the screen to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Navigate(Route),
    Notice(Notice),
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("View was left before the request finished")]
    Stale,
}

impl FormError {
    /// Message to show above the form, if this error has one.
    /// Field errors are shown next to their fields instead.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            FormError::Api(e) => Some(Notice::error(e.user_message())),
            FormError::Invalid(_) | FormError::Stale => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FormError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Notice from a `{ msg }` body, falling back when the server sent none.
pub(crate) fn message_notice(msg: String, fallback: &str) -> Notice {
    if msg.trim().is_empty() {
        Notice::success(fallback)
    } else {
        Notice::success(msg)
    }
}
