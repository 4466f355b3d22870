//! Client-side routes.
//!
//! Paths follow the web layout: `/`, `/register`, `/create-account`,
//! `/forgot-password`, `/forgot-password/:id`, `/confirm/:id`, and the
//! protected `/home`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`, the entry route
    Login,
    Register,
    CreateAccount,
    ForgotPassword,
    /// `/forgot-password/:id` with the reset token
    NewPassword(String),
    /// `/confirm/:id` with the confirmation token
    ConfirmAccount(String),
    Home,
}

impl Route {
    /// Parse a path. Query strings, fragments and a trailing slash are
    /// ignored. Unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Login),
            ["register"] => Some(Route::Register),
            ["create-account"] => Some(Route::CreateAccount),
            ["forgot-password"] => Some(Route::ForgotPassword),
            ["forgot-password", token] => Some(Route::NewPassword(token.to_string())),
            ["confirm", token] => Some(Route::ConfirmAccount(token.to_string())),
            ["home"] => Some(Route::Home),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Register => "/register".to_string(),
            Route::CreateAccount => "/create-account".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::NewPassword(token) => format!("/forgot-password/{}", token),
            Route::ConfirmAccount(token) => format!("/confirm/{}", token),
            Route::Home => "/home".to_string(),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Home)
    }

    /// Screen title.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Register => "Register",
            Route::CreateAccount => "Create an account",
            Route::ForgotPassword => "Did you forget your password?",
            Route::NewPassword(_) => "New Password",
            Route::ConfirmAccount(_) => "Confirm account",
            Route::Home => "Home",
        }
    }

    /// One-line description shown under the title.
    pub fn description(&self) -> &'static str {
        match self {
            Route::Login => "Enter your email below to login",
            Route::Register => "This is your public display name.",
            Route::CreateAccount => "Enter your email below to create your account",
            Route::ForgotPassword => "Enter your email to recover your password",
            Route::NewPassword(_) => "Choose a new password for your account",
            Route::ConfirmAccount(_) => "Your account will be automatically confirmed...",
            Route::Home => "",
        }
    }

    /// Links offered at the bottom of the screen, as (label, target).
    pub fn links(&self) -> Vec<(&'static str, Route)> {
        match self {
            Route::Login => vec![
                ("Create account", Route::CreateAccount),
                ("Did you forget your password?", Route::ForgotPassword),
            ],
            Route::Register | Route::CreateAccount => vec![
                ("Login", Route::Login),
                ("Did you forget your password?", Route::ForgotPassword),
            ],
            Route::ForgotPassword | Route::NewPassword(_) | Route::ConfirmAccount(_) => vec![
                ("Login", Route::Login),
                ("Create account", Route::CreateAccount),
            ],
            Route::Home => Vec::new(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
