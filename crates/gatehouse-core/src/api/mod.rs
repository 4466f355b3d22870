//! REST API client module for the users service.
//!
//! This module provides the `ApiClient` bound to the configured base URL
//! and the `ApiError` taxonomy used by every auth flow.
//!
//! Authenticated calls carry the session token as a bearer credential.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;
