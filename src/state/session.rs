//! Session store: the single source of truth for who is logged in.
//!
//! SYSTEM CONTEXT
//! ==============
//! The login flow hands a successful `{token, user}` to `login()`. The route
//! guard watches `is_loading`/`is_authenticated`, and `ApiService` reads the
//! credential from here on every call.
//!
//! DESIGN
//! ======
//! State lives in a `tokio::sync::watch` channel. `login()` writes identity
//! and credential inside one `send_modify`, so no reader can observe one set
//! without the other. `current()` clones the latest value and never touches
//! storage. Memory is updated first and the durable record written after;
//! persistence failures are logged and swallowed, so the in-memory session
//! stays authoritative for this process.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::storage::{self, Storage};
use crate::auth::mock::MOCK_TOKEN_PREFIX;
use crate::net::types::User;

/// Durable storage key for the persisted session record.
pub const SESSION_KEY: &str = "seckav_session";

// =============================================================================
// SESSION SNAPSHOT
// =============================================================================

/// Point-in-time view of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<User>,
    pub credential: Option<String>,
    /// True only until the first restore from storage has finished.
    pub is_loading: bool,
}

impl Session {
    fn restoring() -> Self {
        Self { identity: None, credential: None, is_loading: true }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.credential.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// True when the credential was fabricated by the offline mock backend.
    pub fn is_mock(&self) -> bool {
        self.is_authenticated()
            && self
                .credential
                .as_deref()
                .is_some_and(|c| c.starts_with(MOCK_TOKEN_PREFIX))
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    user: User,
    token: String,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug)]
struct Inner {
    state: watch::Sender<Session>,
    storage: Arc<dyn Storage>,
    restored: AtomicBool,
    /// Set once a guard has sent a signed-out viewer to sign-in.
    redirect_latched: AtomicBool,
}

/// Shared handle to the process-wide session. Clones share one session.
#[derive(Clone, Debug)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Empty store in the loading phase. Call `init()` once at start.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (state, _) = watch::channel(Session::restoring());
        let inner = Inner {
            state,
            storage,
            restored: AtomicBool::new(false),
            redirect_latched: AtomicBool::new(false),
        };
        Self { inner: Arc::new(inner) }
    }

    /// Restore a persisted session, then leave the loading phase.
    ///
    /// Runs once; later calls are no-ops. A missing, unreadable or corrupt
    /// record is treated as "no session".
    pub fn init(&self) {
        if self.inner.restored.swap(true, Ordering::SeqCst) {
            return;
        }

        let restored = match storage::load_json::<StoredSession>(self.inner.storage.as_ref(), SESSION_KEY) {
            Ok(Some(record)) if !record.token.is_empty() => {
                debug!(user_id = %record.user.id, "session restored from storage");
                Some(record)
            }
            Ok(Some(_)) => {
                warn!("persisted session has an empty credential; ignoring");
                None
            }
            Ok(None) => {
                debug!("no persisted session");
                None
            }
            Err(e) => {
                warn!(error = %e, "persisted session unreadable; starting logged out");
                None
            }
        };

        self.inner.state.send_modify(|s| {
            if let Some(record) = restored {
                s.identity = Some(record.user);
                s.credential = Some(record.token);
            }
            s.is_loading = false;
        });
    }

    /// Replace the session with `identity` + `credential` and persist it.
    ///
    /// An empty credential cannot form a session; it logs out instead.
    pub fn login(&self, identity: User, credential: impl Into<String>) {
        let credential = credential.into();
        if credential.is_empty() {
            warn!(user_id = %identity.id, "login without a credential; clearing session");
            self.logout();
            return;
        }

        info!(user_id = %identity.id, "session started");
        let record = StoredSession { user: identity.clone(), token: credential.clone() };
        self.inner.state.send_modify(|s| {
            s.identity = Some(identity);
            s.credential = Some(credential);
        });

        if let Err(e) = storage::save_json(self.inner.storage.as_ref(), SESSION_KEY, &record) {
            warn!(error = %e, "failed to persist session");
        }
    }

    /// Clear the session and its durable record. Idempotent.
    pub fn logout(&self) {
        let changed = self.inner.state.send_if_modified(|s| {
            if s.identity.is_none() && s.credential.is_none() {
                return false;
            }
            s.identity = None;
            s.credential = None;
            true
        });
        if changed {
            info!("session cleared");
        }
        if let Err(e) = self.inner.storage.remove_item(SESSION_KEY) {
            warn!(error = %e, "failed to remove persisted session");
        }
    }

    /// Synchronous snapshot; never performs I/O.
    pub fn current(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Claim the one-shot sign-in redirect. Only the first caller since the
    /// last `release_redirect` gets `true`, whichever guard it is.
    pub(crate) fn claim_redirect(&self) -> bool {
        !self.inner.redirect_latched.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn release_redirect(&self) {
        self.inner.redirect_latched.store(false, Ordering::SeqCst);
    }

    /// Receiver that wakes on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }
}
