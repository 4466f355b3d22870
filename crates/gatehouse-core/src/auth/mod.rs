//! Authentication session lifecycle.
//!
//! This module provides:
//! - `Session` / `SessionStore`: the viewer's identity and its single owner
//! - `TokenStore`: durable storage for the persisted bearer token
//! - `bootstrap`: one-shot rehydration of the store at startup
//! - `guard`: gating of protected routes on the store's state
//! - `ViewGeneration` / `ViewScope`: discarding results for views already left

pub mod bootstrap;
pub mod guard;
pub mod scope;
pub mod session;
pub mod storage;

pub use bootstrap::{bootstrap, BootstrapOutcome, BootstrapPolicy};
pub use guard::{GuardDecision, GuardState};
pub use scope::{ViewGeneration, ViewScope};
pub use session::{Session, SessionState, SessionStore};
pub use storage::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::ApiClient;
    use crate::forms::{FormOutcome, LoginForm};
    use crate::routes::Route;

    #[tokio::test]
    async fn test_sign_out_survives_restart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "u1", "email": "ada@example.com", "name": "Ada", "token": "tok"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "u1", "email": "ada@example.com", "name": "Ada"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client");

        let store = SessionStore::new(Arc::new(FileTokenStore::new(dir.path())));
        bootstrap(&api, &store, BootstrapPolicy::default()).await;
        let form = LoginForm {
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        let outcome = form
            .submit(&api, &store, &ViewGeneration::new().scope())
            .await
            .expect("login");
        assert_eq!(outcome, FormOutcome::Navigate(Route::Home));

        // A restart with the token still on disk comes back signed in.
        let restarted = SessionStore::new(Arc::new(FileTokenStore::new(dir.path())));
        bootstrap(&api, &restarted, BootstrapPolicy::default()).await;
        assert_eq!(guard::evaluate(&restarted.snapshot()), GuardState::Authenticated);

        restarted.sign_out().expect("sign out");

        let after = SessionStore::new(Arc::new(FileTokenStore::new(dir.path())));
        let outcome = bootstrap(&api, &after, BootstrapPolicy::default()).await;
        assert!(matches!(outcome, BootstrapOutcome::Anonymous));
        assert_eq!(guard::evaluate(&after.snapshot()), GuardState::Anonymous);
        assert_eq!(
            guard::decide(&Route::Home, &after.snapshot()),
            GuardDecision::Redirect(Route::Login)
        );
    }
}
