use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::storage::TokenStore;

/// The viewer's authentication identity.
///
/// The default value is the anonymous session: empty token, no subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: String,
    #[serde(
        rename = "_id",
        alias = "subjectId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.subject_id.is_some()
    }

    /// Name to greet the viewer with, falling back to the email.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Whether the body named a subject. Blank identifiers do not count.
    pub(crate) fn has_subject(&self) -> bool {
        self.subject_id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    /// Blank identifiers count as absent.
    fn normalized(mut self) -> Self {
        if self.subject_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            self.subject_id = None;
        }
        self
    }
}

/// Everything the route guard looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub session: Session,
    pub loading: bool,
}

/// Single owner of the current [`Session`] and the loading flag.
///
/// Clones share the same state. Readers either take a snapshot or
/// [`subscribe`](Self::subscribe) to be woken on every change.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
    tokens: Arc<dyn TokenStore>,
    bootstrapped: Arc<AtomicBool>,
    /// Bumped on every session replacement.
    revision: Arc<AtomicU64>,
}

impl SessionStore {
    /// New store with an empty session and the loading flag raised.
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let (tx, _rx) = watch::channel(SessionState {
            session: Session::default(),
            loading: true,
        });
        Self {
            state: Arc::new(tx),
            tokens,
            bootstrapped: Arc::new(AtomicBool::new(false)),
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn session(&self) -> Session {
        self.state.borrow().session.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_authenticated()
    }

    /// Replace the session wholesale.
    pub fn set_session(&self, session: Session) {
        let session = session.normalized();
        debug!(authenticated = session.is_authenticated(), "Session replaced");
        self.revision.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| state.session = session);
    }

    /// Number of session replacements so far. A caller that read it before
    /// an await can tell whether someone else wrote in the meantime.
    pub(crate) fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Reset to the anonymous session without touching storage.
    pub fn clear_session(&self) {
        self.set_session(Session::default());
    }

    pub(crate) fn finish_loading(&self) {
        self.state.send_modify(|state| state.loading = false);
    }

    /// Claim the one bootstrap run this store allows.
    pub(crate) fn claim_bootstrap(&self) -> bool {
        !self.bootstrapped.swap(true, Ordering::SeqCst)
    }

    /// Sign out: reset the session and remove the persisted token.
    ///
    /// The in-memory session is cleared even when storage fails; the storage
    /// error is returned so the caller can report it.
    pub fn sign_out(&self) -> Result<()> {
        self.clear_session();
        match self.tokens.remove() {
            Ok(()) => {
                info!("Signed out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Signed out but failed to remove persisted token");
                Err(e)
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Durable storage holding the persisted token.
    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }
}
