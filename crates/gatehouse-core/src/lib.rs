//! Gatehouse core: the client side of an email/password account service.
//!
//! - `api`: HTTP client bound to the service's base URL
//! - `auth`: session store, token persistence, startup rehydration, route guard
//! - `forms`: login, sign-up, password recovery and confirmation flows
//! - `routes`: the screen paths and which of them are protected
//! - `config`: configuration file and environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod models;
pub mod routes;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, SessionState, SessionStore};
pub use config::Config;
pub use routes::Route;
