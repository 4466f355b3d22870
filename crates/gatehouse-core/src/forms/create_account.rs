use tracing::info;

use crate::api::ApiClient;
use crate::auth::{SessionStore, ViewScope};
use crate::models::NewAccount;
use crate::routes::Route;

use super::validate::{check_confirmation, check_email, check_name, check_password};
use super::{Field, FieldErrors, FormError, FormOutcome};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateAccountForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

impl CreateAccountForm {
    pub fn validate(&self) -> Result<NewAccount, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = self.name.trim();
        let email = self.email.trim();
        check_name(&mut errors, name);
        check_email(&mut errors, email);
        check_password(&mut errors, Field::Password, &self.password);
        check_password(&mut errors, Field::Confirm, &self.confirm);
        check_confirmation(&mut errors, &self.password, &self.confirm);
        errors.into_result(NewAccount {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    pub async fn submit(
        &self,
        api: &ApiClient,
        store: &SessionStore,
        scope: &ViewScope,
    ) -> Result<FormOutcome, FormError> {
        let account = self.validate().map_err(FormError::Invalid)?;
        create(api, store, scope, &account).await
    }
}

/// `POST /users`, then populate the store and go to `/home`. The token in
/// the response is not persisted.
pub(crate) async fn create(
    api: &ApiClient,
    store: &SessionStore,
    scope: &ViewScope,
    account: &NewAccount,
) -> Result<FormOutcome, FormError> {
    let session = api.create_account(account).await?;

    if !scope.is_live() {
        return Err(FormError::Stale);
    }

    store.set_session(session);
    info!("Account created");
    Ok(FormOutcome::Navigate(Route::Home))
}
