//! Setting a new password from a reset link.
//!
//! The reset token is checked when the screen opens. A token the API does
//! not accept hides the form for good; the viewer has to request a new
//! link.

use tracing::{debug, info};

use crate::api::ApiClient;
use crate::auth::ViewScope;
use crate::models::NewPassword;

use super::validate::{check_confirmation, check_password};
use super::{message_notice, Field, FieldErrors, FormError, FormOutcome, Notice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetTokenStatus {
    Valid(Notice),
    Invalid(Notice),
}

impl ResetTokenStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ResetTokenStatus::Valid(_))
    }

    pub fn notice(&self) -> &Notice {
        match self {
            ResetTokenStatus::Valid(notice) | ResetTokenStatus::Invalid(notice) => notice,
        }
    }
}

/// Ask the API whether `token` can still be used. Any failure counts as an
/// invalid token; only a stale scope is reported as an error.
pub async fn check_reset_token(
    api: &ApiClient,
    token: &str,
    scope: &ViewScope,
) -> Result<ResetTokenStatus, FormError> {
    let result = api.check_reset_token(token).await;

    if !scope.is_live() {
        return Err(FormError::Stale);
    }

    Ok(match result {
        Ok(reply) => ResetTokenStatus::Valid(message_notice(reply.msg, "Enter your new password")),
        Err(e) => {
            debug!(error = %e, "Reset token refused");
            ResetTokenStatus::Invalid(Notice::error(e.user_message()))
        }
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPasswordForm {
    pub password: String,
    pub confirm: String,
}

impl NewPasswordForm {
    pub fn validate(&self) -> Result<NewPassword, FieldErrors> {
        let mut errors = FieldErrors::default();
        check_password(&mut errors, Field::Password, &self.password);
        check_password(&mut errors, Field::Confirm, &self.confirm);
        check_confirmation(&mut errors, &self.password, &self.confirm);
        errors.into_result(NewPassword {
            password: self.password.clone(),
        })
    }

    pub async fn submit(
        &self,
        api: &ApiClient,
        token: &str,
        scope: &ViewScope,
    ) -> Result<FormOutcome, FormError> {
        let body = self.validate().map_err(FormError::Invalid)?;
        let reply = api.set_new_password(token, &body).await?;

        if !scope.is_live() {
            return Err(FormError::Stale);
        }

        info!("Password changed");
        Ok(FormOutcome::Notice(message_notice(reply.msg, "Password changed")))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::ViewGeneration;
    use crate::forms::validate::PASSWORD_MISMATCH;

    fn api_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn test_valid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/forgot-password/good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg": "Valid token"})))
            .mount(&server)
            .await;

        let status = check_reset_token(&api_for(&server), "good", &ViewScope::detached())
            .await
            .expect("checked");
        assert!(status.is_valid());
        assert_eq!(status.notice(), &Notice::success("Valid token"));
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/forgot-password/bad"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"msg": "Invalid token"})))
            .mount(&server)
            .await;

        let status = check_reset_token(&api_for(&server), "bad", &ViewScope::detached())
            .await
            .expect("checked");
        assert_eq!(status, ResetTokenStatus::Invalid(Notice::error("Invalid token")));
    }

    #[tokio::test]
    async fn test_check_after_leaving_is_stale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg": "ok"})))
            .mount(&server)
            .await;

        let generation = ViewGeneration::new();
        let scope = generation.scope();
        generation.advance();

        let err = check_reset_token(&api_for(&server), "good", &scope).await.unwrap_err();
        assert!(matches!(err, FormError::Stale));
    }

    #[test]
    fn test_validate_mismatch() {
        let form = NewPasswordForm {
            password: "secret1".to_string(),
            confirm: "secret2".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(Field::Confirm), Some(PASSWORD_MISMATCH));
    }

    #[tokio::test]
    async fn test_submit_sets_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/forgot-password/good"))
            .and(body_json(json!({"password": "newpass"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "msg": "Password updated"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let form = NewPasswordForm {
            password: "newpass".to_string(),
            confirm: "newpass".to_string(),
        };
        let outcome = form
            .submit(&api_for(&server), "good", &ViewScope::detached())
            .await
            .expect("changed");
        assert_eq!(outcome, FormOutcome::Notice(Notice::success("Password updated")));
    }

    #[tokio::test]
    async fn test_submit_failure_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/forgot-password/good"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"msg": "Token expired"})))
            .mount(&server)
            .await;

        let form = NewPasswordForm {
            password: "newpass".to_string(),
            confirm: "newpass".to_string(),
        };
        let err = form
            .submit(&api_for(&server), "good", &ViewScope::detached())
            .await
            .unwrap_err();
        assert_eq!(err.notice(), Some(Notice::error("Token expired")));
    }
}
