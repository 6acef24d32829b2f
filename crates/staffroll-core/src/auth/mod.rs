//! Authentication module for managing the user session and its credential.
//!
//! This module provides:
//! - `SessionManager`: the two-state sign-in state machine with change subscription
//! - `CredentialStore`: one-slot token storage (file, OS keychain, or memory)
//!
//! Stored tokens are trusted at startup and dropped the first time the
//! backend rejects them.

pub mod credentials;
pub mod session;

pub use credentials::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore,
};
pub use session::{Session, SessionManager, SessionStatus};
