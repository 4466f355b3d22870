//! Session rehydration at startup.
//!
//! Reads the persisted token, asks the API who it belongs to, and settles
//! the store into either an authenticated or an anonymous state. The
//! loading flag is lowered on every path.

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::routes::Route;

use super::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapPolicy {
    /// Remove the persisted token when the API rejects it.
    pub purge_rejected_token: bool,
}

impl Default for BootstrapPolicy {
    fn default() -> Self {
        Self {
            purge_rejected_token: true,
        }
    }
}

#[derive(Debug)]
pub enum BootstrapOutcome {
    /// No persisted token.
    Anonymous,
    /// Token confirmed; the store holds the viewer's session.
    Authenticated,
    /// The profile request failed; the store holds the empty session.
    Rejected(ApiError),
    /// The session was replaced while the profile request was in flight,
    /// for example by a login. Neither the session nor storage was touched.
    Superseded,
    /// Bootstrap had already run for this store.
    AlreadyRan,
}

impl BootstrapOutcome {
    /// Where to go once bootstrap settles, if anywhere.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            BootstrapOutcome::Authenticated => Some(Route::Home),
            _ => None,
        }
    }
}

/// Rehydrate `store` from its persisted token. Runs at most once per store.
pub async fn bootstrap(
    api: &ApiClient,
    store: &SessionStore,
    policy: BootstrapPolicy,
) -> BootstrapOutcome {
    if !store.claim_bootstrap() {
        warn!("Session bootstrap requested twice, ignoring");
        return BootstrapOutcome::AlreadyRan;
    }

    let token = match store.tokens().load() {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Failed to read persisted token, continuing anonymously");
            None
        }
    };

    let Some(token) = token else {
        debug!("No persisted token");
        store.finish_loading();
        return BootstrapOutcome::Anonymous;
    };

    let revision = store.revision();
    let result = api.profile(&token).await;

    if store.revision() != revision {
        debug!("Session replaced during rehydration, dropping profile result");
        store.finish_loading();
        return BootstrapOutcome::Superseded;
    }

    let outcome = match result {
        Ok(mut session) => {
            if session.token.is_empty() {
                session.token = token;
            }
            store.set_session(session);
            info!(authenticated = store.is_authenticated(), "Session rehydrated");
            BootstrapOutcome::Authenticated
        }
        Err(e) => {
            warn!(error = %e, "Session rehydration failed");
            store.clear_session();
            if e.is_rejection() && policy.purge_rejected_token {
                match store.tokens().remove() {
                    Ok(()) => info!("Purged rejected token"),
                    Err(remove_err) => warn!(error = %remove_err, "Failed to purge rejected token"),
                }
            }
            BootstrapOutcome::Rejected(e)
        }
    };

    store.finish_loading();
    outcome
}
