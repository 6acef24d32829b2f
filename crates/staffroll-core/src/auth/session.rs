use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::AuthFailureHandler;

use super::CredentialStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Unauthenticated,
    Authenticated,
}

/// Snapshot of the sign-in state.
///
/// The token is present (and non-empty) exactly when the status is
/// `Authenticated`; the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    status: SessionStatus,
    token: Option<String>,
    authenticated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            token: None,
            authenticated_at: None,
        }
    }

    fn authenticated(token: String, authenticated_at: Option<DateTime<Utc>>) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            token: Some(token),
            authenticated_at,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// When the current token was handed to `login`. `None` for sessions
    /// restored from the credential store at startup.
    pub fn authenticated_at(&self) -> Option<DateTime<Utc>> {
        self.authenticated_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

struct Inner {
    credentials: Arc<dyn CredentialStore>,
    state: watch::Sender<Session>,
}

/// Sole owner of the session and sole writer of the credential store.
///
/// Every mutation runs under the watch channel's write lock, and the store is
/// updated inside that same critical section, so state and store cannot drift
/// apart when logouts race on different threads.
/// Clone is cheap and every clone manages the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// Restore the session from the credential store.
    ///
    /// A stored token is trusted as-is. If the backend no longer accepts it,
    /// the first rejected request ends the session.
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        let session = match credentials.get() {
            Some(token) if !token.trim().is_empty() => {
                debug!("Stored credential found, restoring session");
                Session::authenticated(token, None)
            }
            _ => {
                debug!("No stored credential");
                Session::unauthenticated()
            }
        };
        let (state, _) = watch::channel(session);
        Self {
            inner: Arc::new(Inner { credentials, state }),
        }
    }

    /// Start (or replace) the session with a token issued by the backend.
    pub fn login(&self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            warn!("Ignoring login with an empty token");
            return;
        }

        let credentials = &self.inner.credentials;
        self.inner.state.send_modify(|session| {
            credentials.set(&token);
            *session = Session::authenticated(token, Some(Utc::now()));
        });
        info!("Session authenticated");
    }

    /// End the session. Calling this while signed out changes nothing.
    pub fn logout(&self) {
        let credentials = &self.inner.credentials;
        let ended = self.inner.state.send_if_modified(|session| {
            credentials.clear();
            if session.is_authenticated() {
                *session = Session::unauthenticated();
                true
            } else {
                false
            }
        });

        if ended {
            info!("Session ended by logout");
        } else {
            debug!("Logout while signed out");
        }
    }

    /// End the session because the backend rejected a credential.
    ///
    /// Always leaves the session unauthenticated with an empty store, whichever
    /// token was rejected. Returns whether a transition happened, so repeated
    /// rejections after the first report `false`.
    pub fn force_logout(&self) -> bool {
        let credentials = &self.inner.credentials;
        let ended = self.inner.state.send_if_modified(|session| {
            credentials.clear();
            if session.is_authenticated() {
                *session = Session::unauthenticated();
                true
            } else {
                false
            }
        });

        if ended {
            warn!("Credential rejected by server, session ended");
        } else {
            debug!("Credential rejected while already signed out");
        }
        ended
    }

    pub fn current_session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Receiver that observes every session change. Intermediate states may
    /// be coalesced; the latest state is always visible.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }
}

impl AuthFailureHandler for SessionManager {
    fn on_authentication_failed(&self, _rejected_token: &str) {
        self.force_logout();
    }
}
