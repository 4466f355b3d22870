use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Message shown when the API could not be reached at all.
pub const TRANSPORT_MESSAGE: &str = "Unable to connect to server. Check your connection.";

/// Message shown when the API answered with something we could not read.
pub const INVALID_RESPONSE_MESSAGE: &str = "The server sent an unexpected response.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Any non-2xx answer. `message` is the body's `msg` field when present.
    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.msg)
            .filter(|m| !m.trim().is_empty());
        ApiError::Rejected { status, message }
    }

    /// True when the server answered and refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// The single display string for this error.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected {
                message: Some(msg), ..
            } => msg.clone(),
            ApiError::Rejected { status, .. } => format!("Request failed ({})", status),
            ApiError::Transport(e) if e.is_decode() => INVALID_RESPONSE_MESSAGE.to_string(),
            ApiError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            ApiError::InvalidResponse(_) => INVALID_RESPONSE_MESSAGE.to_string(),
            ApiError::InvalidRequest(msg) => msg.clone(),
        }
    }
}
