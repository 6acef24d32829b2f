//! Navigation gate for protected views.
//!
//! This is a UX guard only; the backend enforces access on every request.

use tokio::sync::watch;
use tracing::debug;

use crate::auth::{Session, SessionManager};

/// Outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow { path: String },
    Redirect { to: String },
}

impl Navigation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Navigation::Allow { .. })
    }
}

pub struct RouteGuard {
    session: watch::Receiver<Session>,
    sign_in_path: String,
    public_paths: Vec<String>,
}

impl RouteGuard {
    /// Guard everything except `sign_in_path` and `public_paths`.
    pub fn new(
        session: &SessionManager,
        sign_in_path: impl Into<String>,
        public_paths: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            session: session.subscribe(),
            sign_in_path: normalize_path(&sign_in_path.into()),
            public_paths: public_paths
                .into_iter()
                .map(|p| normalize_path(&p.into()))
                .collect(),
        }
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    pub fn is_public(&self, destination: &str) -> bool {
        let destination = normalize_path(destination);
        destination == self.sign_in_path || self.public_paths.iter().any(|p| *p == destination)
    }

    /// Decide a navigation attempt against the current session.
    pub fn evaluate(&self, destination: &str) -> Navigation {
        if self.is_public(destination) || self.session.borrow().is_authenticated() {
            Navigation::Allow {
                path: destination.to_string(),
            }
        } else {
            debug!(destination, "Redirecting unauthenticated navigation");
            Navigation::Redirect {
                to: self.sign_in_path.clone(),
            }
        }
    }

    /// Wait until the view at `current` must be left.
    ///
    /// Resolves with a redirect as soon as the session stops being
    /// authenticated (immediately if it already isn't), or `None` once the
    /// session manager is gone. Public views never redirect.
    pub async fn next_redirect(&mut self, current: &str) -> Option<Navigation> {
        if self.is_public(current) {
            return None;
        }
        loop {
            let nav = {
                let _ = self.session.borrow_and_update();
                self.evaluate(current)
            };
            if !nav.is_allowed() {
                return Some(nav);
            }
            if self.session.changed().await.is_err() {
                return None;
            }
        }
    }
}

/// Strip query, fragment, and trailing slashes so `/employees/` and
/// `/employees?x=1` compare equal to `/employees`.
fn normalize_path(path: &str) -> String {
    let path = path.trim();
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
