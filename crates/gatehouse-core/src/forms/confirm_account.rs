use tracing::debug;

use crate::api::ApiClient;
use crate::auth::ViewScope;

use super::{message_notice, FormError, Notice};

/// Confirm the account behind `token`, run as soon as the screen opens.
/// Success and failure both end in a notice; only a stale scope is an error.
pub async fn confirm_account(
    api: &ApiClient,
    token: &str,
    scope: &ViewScope,
) -> Result<Notice, FormError> {
    let result = api.confirm_account(token).await;

    if !scope.is_live() {
        return Err(FormError::Stale);
    }

    Ok(match result {
        Ok(reply) => message_notice(reply.msg, "Account confirmed"),
        Err(e) => {
            debug!(error = %e, "Account confirmation failed");
            Notice::error(e.user_message())
        }
    })
}
