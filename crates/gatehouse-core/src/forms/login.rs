use tracing::{info, warn};

use crate::api::ApiClient;
use crate::auth::{SessionStore, ViewScope};
use crate::models::Credentials;
use crate::routes::Route;

use super::validate::{check_email, check_password};
use super::{Field, FieldErrors, FormError, FormOutcome};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = self.email.trim();
        check_email(&mut errors, email);
        check_password(&mut errors, Field::Password, &self.password);
        errors.into_result(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    /// Exchange the credentials for a session. On success the token is
    /// persisted, the store populated, and the viewer sent to `/home`.
    pub async fn submit(
        &self,
        api: &ApiClient,
        store: &SessionStore,
        scope: &ViewScope,
    ) -> Result<FormOutcome, FormError> {
        let credentials = self.validate().map_err(FormError::Invalid)?;
        let session = api.login(&credentials).await?;

        if !scope.is_live() {
            return Err(FormError::Stale);
        }

        if let Err(e) = store.tokens().store(&session.token) {
            warn!(error = %e, "Failed to persist token");
        }
        store.set_session(session);
        info!("Login successful");
        Ok(FormOutcome::Navigate(Route::Home))
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
    use crate::api::ApiError;
    use crate::auth::{MemoryTokenStore, TokenStore, ViewGeneration};
    use crate::forms::validate::{INVALID_EMAIL, SHORT_PASSWORD};
    use crate::forms::Notice;

    fn form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn api_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn test_validate() {
        assert!(form("ada@example.com", "secret").validate().is_ok());

        let errors = form("nope", "12345").validate().unwrap_err();
        assert_eq!(errors.get(Field::Email), Some(INVALID_EMAIL));
        assert_eq!(errors.get(Field::Password), Some(SHORT_PASSWORD));
    }

    #[test]
    fn test_validate_trims_email() {
        let credentials = form("  ada@example.com ", "secret").validate().expect("valid");
        assert_eq!(credentials.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_success_persists_token_and_populates_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .and(body_json(json!({"email": "ada@example.com", "password": "secret1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t", "subjectId": "u1", "email": "ada@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::default());
        let store = SessionStore::new(tokens.clone());
        let outcome = form("ada@example.com", "secret1")
            .submit(&api_for(&server), &store, &ViewScope::detached())
            .await
            .expect("login");

        assert_eq!(outcome, FormOutcome::Navigate(Route::Home));
        assert_eq!(store.session().subject_id.as_deref(), Some("u1"));
        assert_eq!(tokens.load().expect("load"), Some("t".to_string()));
    }

    #[tokio::test]
    async fn test_short_password_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = SessionStore::new(Arc::new(MemoryTokenStore::default()));
        for password in ["", "a", "12345"] {
            let err = form("ada@example.com", password)
                .submit(&api_for(&server), &store, &ViewScope::detached())
                .await
                .unwrap_err();
            let errors = err.field_errors().expect("field errors");
            assert_eq!(errors.get(Field::Password), Some(SHORT_PASSWORD));
        }
    }

    #[tokio::test]
    async fn test_rejection_shows_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "msg": "Incorrect password"
            })))
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::default());
        let store = SessionStore::new(tokens.clone());
        let err = form("ada@example.com", "secret1")
            .submit(&api_for(&server), &store, &ViewScope::detached())
            .await
            .unwrap_err();

        assert_eq!(err.notice(), Some(Notice::error("Incorrect password")));
        assert!(!store.is_authenticated());
        assert_eq!(tokens.load().expect("load"), None);
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t", "_id": "u1", "email": "ada@example.com"
            })))
            .mount(&server)
            .await;

        let generation = ViewGeneration::new();
        let scope = generation.scope();
        // The viewer leaves the screen before the response is applied.
        generation.advance();

        let tokens = Arc::new(MemoryTokenStore::default());
        let store = SessionStore::new(tokens.clone());
        let err = form("ada@example.com", "secret1")
            .submit(&api_for(&server), &store, &scope)
            .await
            .unwrap_err();

        assert!(matches!(err, FormError::Stale));
        assert!(!store.is_authenticated());
        assert_eq!(tokens.load().expect("load"), None);
    }

    #[tokio::test]
    async fn test_reply_without_user_id_is_refused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t", "email": "ada@example.com"
            })))
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::default());
        let store = SessionStore::new(tokens.clone());
        let err = form("ada@example.com", "secret1")
            .submit(&api_for(&server), &store, &ViewScope::detached())
            .await
            .unwrap_err();

        assert!(matches!(err, FormError::Api(ApiError::InvalidResponse(_))));
        assert!(!store.is_authenticated());
        assert_eq!(tokens.load().expect("load"), None);
    }
}
