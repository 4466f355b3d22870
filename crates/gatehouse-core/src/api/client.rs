//! API client for the users service.
//!
//! `ApiClient` is bound to a single base URL (for example
//! `http://localhost:4000/api`) and exposes one method per endpoint the
//! auth screens use. It holds no credentials; authenticated calls take the
//! bearer token as an argument.

use std::time::Duration;

use reqwest::{header, Client, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::Session;
use crate::models::{ApiMessage, Credentials, NewAccount, NewPassword, ResetRequest};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API client for the users service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client bound to `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Self::parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        debug!(base_url = %base_url, "API client created");
        Ok(Self { client, base_url })
    }

    /// Validate and normalize the configured base URL.
    fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
        let trimmed = raw.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|e| anyhow::anyhow!("Invalid API base URL '{}': {}", raw, e))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                anyhow::bail!("Unsupported API URL scheme '{}' (expected http or https)", other)
            }
        }
        if url.cannot_be_a_base() {
            anyhow::bail!("API base URL '{}' cannot carry a path", raw);
        }
        Ok(url)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build an endpoint URL from path segments. Each segment is
    /// percent-encoded, so tokens taken from a route cannot inject paths.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| {
                    ApiError::InvalidRequest("API base URL cannot carry a path".to_string())
                })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %ApiError::truncate_body(&body), "API rejected request");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse API response");
            ApiError::InvalidResponse(format!("{}: {}", url.path(), e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, token: Option<&str>) -> Result<T, ApiError> {
        let mut request = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        Self::parse(response, &url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(url.clone())
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response, &url).await
    }

    // ===== Session endpoints =====

    /// A session body must name its subject, or the viewer would be sent to
    /// a protected screen the guard then refuses.
    fn require_subject(session: Session, url: &Url) -> Result<Session, ApiError> {
        if session.has_subject() {
            Ok(session)
        } else {
            warn!(url = %url, "Session response carried no user id");
            Err(ApiError::InvalidResponse(format!("{}: response carried no user id", url.path())))
        }
    }

    /// `GET /users/profile` - resolve a bearer token to its identity.
    pub async fn profile(&self, token: &str) -> Result<Session, ApiError> {
        let url = self.endpoint(&["users", "profile"])?;
        let session = self.get(url.clone(), Some(token)).await?;
        Self::require_subject(session, &url)
    }

    /// `POST /users/login` - exchange credentials for a token and identity.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let url = self.endpoint(&["users", "login"])?;
        let session: Session = self.post(url.clone(), credentials).await?;
        if session.token.is_empty() {
            return Err(ApiError::InvalidResponse("login response carried no token".to_string()));
        }
        Self::require_subject(session, &url)
    }

    /// `POST /users` - create an account.
    pub async fn create_account(&self, account: &NewAccount) -> Result<Session, ApiError> {
        let url = self.endpoint(&["users"])?;
        let session = self.post(url.clone(), account).await?;
        Self::require_subject(session, &url)
    }

    // ===== Confirmation and recovery endpoints =====

    /// `GET /users/confirm/:token`
    pub async fn confirm_account(&self, token: &str) -> Result<ApiMessage, ApiError> {
        let url = self.endpoint(&["users", "confirm", token])?;
        self.get(url, None).await
    }

    /// `POST /users/forgot-password`
    pub async fn request_password_reset(
        &self,
        request: &ResetRequest,
    ) -> Result<ApiMessage, ApiError> {
        let url = self.endpoint(&["users", "forgot-password"])?;
        self.post(url, request).await
    }

    /// `GET /users/forgot-password/:token` - check that a reset token is usable.
    pub async fn check_reset_token(&self, token: &str) -> Result<ApiMessage, ApiError> {
        let url = self.endpoint(&["users", "forgot-password", token])?;
        self.get(url, None).await
    }

    /// `POST /users/forgot-password/:token`
    pub async fn set_new_password(
        &self,
        token: &str,
        body: &NewPassword,
    ) -> Result<ApiMessage, ApiError> {
        let url = self.endpoint(&["users", "forgot-password", token])?;
        self.post(url, body).await
    }
}
