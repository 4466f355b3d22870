//! Request and response bodies exchanged with the users API.
//!
//! Every endpoint either answers with a Session-shaped body (see
//! [`crate::auth::Session`]) or with a bare `{ "msg": ... }` message.

use serde::{Deserialize, Serialize};

/// Body for `POST /users/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body for `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body for `POST /users/forgot-password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetRequest {
    pub email: String,
}

/// Body for `POST /users/forgot-password/:token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPassword {
    pub password: String,
}

/// The `{ msg }` body returned by confirmation and recovery endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub msg: String,
}
