use tracing::debug;

use crate::api::ApiClient;
use crate::auth::ViewScope;
use crate::models::ResetRequest;

use super::validate::check_email;
use super::{message_notice, FieldErrors, FormError, FormOutcome};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<ResetRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = self.email.trim();
        check_email(&mut errors, email);
        errors.into_result(ResetRequest {
            email: email.to_string(),
        })
    }

    /// Ask the API to mail reset instructions. The server's confirmation
    /// message is shown verbatim.
    pub async fn submit(
        &self,
        api: &ApiClient,
        scope: &ViewScope,
    ) -> Result<FormOutcome, FormError> {
        let request = self.validate().map_err(FormError::Invalid)?;
        let reply = api.request_password_reset(&request).await?;

        if !scope.is_live() {
            return Err(FormError::Stale);
        }

        debug!("Password reset requested");
        Ok(FormOutcome::Notice(message_notice(
            reply.msg,
            "We sent you an email with instructions",
        )))
    }
}
