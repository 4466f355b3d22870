use crate::api::ApiClient;
use crate::auth::{SessionStore, ViewScope};
use crate::models::NewAccount;

use super::create_account::create;
use super::validate::{check_email, check_name, check_password};
use super::{Field, FieldErrors, FormError, FormOutcome};

/// The short sign-up form on `/register`: no confirmation field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<NewAccount, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = self.name.trim();
        let email = self.email.trim();
        check_name(&mut errors, name);
        check_email(&mut errors, email);
        check_password(&mut errors, Field::Password, &self.password);
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

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{MemoryTokenStore, ViewGeneration};
    use crate::routes::Route;

    #[test]
    fn test_validate_reports_every_field() {
        let errors = RegisterForm::default().validate().unwrap_err();
        assert!(errors.get(Field::Name).is_some());
        assert!(errors.get(Field::Email).is_some());
        assert!(errors.get(Field::Password).is_some());
        assert!(errors.get(Field::Confirm).is_none());
    }

    #[tokio::test]
    async fn test_register_sends_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_json(json!({
                "name": "Bo", "email": "bo@example.com", "password": "hunter22"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "u2", "email": "bo@example.com", "name": "Bo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client");
        let store = SessionStore::new(Arc::new(MemoryTokenStore::default()));
        let form = RegisterForm {
            name: "Bo".to_string(),
            email: "bo@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        let outcome = form
            .submit(&api, &store, &ViewGeneration::new().scope())
            .await
            .expect("registered");

        assert_eq!(outcome, FormOutcome::Navigate(Route::Home));
        assert_eq!(store.session().display_name.as_deref(), Some("Bo"));
    }
}
