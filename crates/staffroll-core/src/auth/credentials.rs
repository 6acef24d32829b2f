//! Durable storage for the bearer token.
//!
//! The store holds a single optional slot. Backends never surface errors to
//! callers: failures are logged and reads degrade to "no credential".

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Keychain service name
const SERVICE_NAME: &str = "staffroll";

/// Keychain account for the single credential slot
const ACCOUNT_NAME: &str = "session-token";

/// Credential file name in the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

/// One-slot holder of the current bearer token.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;

    fn set(&self, token: &str);

    fn clear(&self);
}

// ============================================================================
// Memory
// ============================================================================

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        match self.slot.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, token: &str) {
        match self.slot.write() {
            Ok(mut slot) => *slot = Some(token.to_string()),
            Err(poisoned) => *poisoned.into_inner() = Some(token.to_string()),
        }
    }

    fn clear(&self) {
        match self.slot.write() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    stored_at: DateTime<Utc>,
}

/// Token persisted as JSON in the application data directory.
///
/// The file is read once when the store is opened. After that the last value
/// handed to `set` or `clear` is served from memory, so a failed write still
/// leaves the process with the credential it was given.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    current: MemoryCredentialStore,
}

impl FileCredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        let path = data_dir.join(CREDENTIALS_FILE);
        let current = MemoryCredentialStore::default();
        match Self::load(&path) {
            Ok(Some(stored)) => {
                debug!(path = ?path, stored_at = %stored.stored_at, "Credential loaded");
                current.set(&stored.token);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, path = ?path, "Ignoring unreadable credential file"),
        }
        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<Option<StoredCredential>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .context("Failed to read credential file")?;
        let stored: StoredCredential = serde_json::from_str(&contents)
            .context("Failed to parse credential file")?;
        if stored.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(stored))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create credential directory")?;
        }
        let stored = StoredCredential {
            token: token.to_string(),
            stored_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, contents).context("Failed to write credential file")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove credential file")?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        self.current.get()
    }

    fn set(&self, token: &str) {
        self.current.set(token);
        if let Err(e) = self.save(token) {
            warn!(error = %e, path = ?self.path, "Failed to persist credential, keeping it for this run only");
        } else {
            debug!(path = ?self.path, "Credential persisted");
        }
    }

    fn clear(&self) {
        self.current.clear();
        if let Err(e) = self.remove() {
            warn!(error = %e, path = ?self.path, "Failed to remove credential");
        }
    }
}

// ============================================================================
// Keyring
// ============================================================================

/// Token kept in the OS keychain.
///
/// Like the file store, the keychain is read once when opened and the last
/// written value is served from memory afterwards.
pub struct KeyringCredentialStore {
    entry: Entry,
    current: MemoryCredentialStore,
}

impl KeyringCredentialStore {
    pub fn new() -> Result<Self> {
        let entry = Entry::new(SERVICE_NAME, ACCOUNT_NAME)
            .context("Failed to create keyring entry")?;
        Ok(Self::with_entry(entry))
    }

    fn with_entry(entry: Entry) -> Self {
        let current = MemoryCredentialStore::default();
        match entry.get_password() {
            Ok(token) if !token.is_empty() => current.set(&token),
            Ok(_) | Err(keyring::Error::NoEntry) => {}
            Err(e) => warn!(error = %e, "Failed to retrieve credential from keychain"),
        }
        Self { entry, current }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Option<String> {
        self.current.get()
    }

    fn set(&self, token: &str) {
        self.current.set(token);
        if let Err(e) = self.entry.set_password(token) {
            warn!(error = %e, "Failed to store credential in keychain, keeping it for this run only");
        }
    }

    fn clear(&self) {
        self.current.clear();
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => warn!(error = %e, "Failed to delete credential from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyring::mock::MockCredential;

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get(), None);

        store.set("abc");
        assert_eq!(store.get().as_deref(), Some("abc"));

        store.set("def");
        assert_eq!(store.get().as_deref(), Some("def"));

        store.clear();
        assert_eq!(store.get(), None);
        // Clearing an empty store is fine
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileCredentialStore::new(dir.path());
        assert_eq!(store.get(), None);

        store.set("xyz");
        let reopened = FileCredentialStore::new(dir.path());
        assert_eq!(reopened.get().as_deref(), Some("xyz"));

        reopened.clear();
        assert!(!store.path().exists());
        assert_eq!(reopened.get(), None);
        assert_eq!(FileCredentialStore::new(dir.path()).get(), None);
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        let store = FileCredentialStore::new(&nested);

        store.set("token");
        assert!(store.path().exists());
        assert_eq!(FileCredentialStore::new(&nested).get().as_deref(), Some("token"));
    }

    #[test]
    fn test_file_store_corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CREDENTIALS_FILE), "not json").expect("write");

        let store = FileCredentialStore::new(dir.path());
        assert_eq!(store.get(), None);

        // A later set overwrites the corrupt file
        store.set("fresh");
        assert_eq!(FileCredentialStore::new(dir.path()).get().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_file_store_keeps_token_when_write_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "regular file").expect("write");

        // The data directory would have to live under a regular file
        let store = FileCredentialStore::new(&blocker.join("staffroll"));
        store.set("abc");
        assert!(!store.path().exists());
        assert_eq!(store.get().as_deref(), Some("abc"));

        store.clear();
        assert_eq!(store.get(), None);
    }

    fn mock_keyring_store() -> KeyringCredentialStore {
        let entry = Entry::new_with_credential(Box::new(MockCredential::default()));
        KeyringCredentialStore::with_entry(entry)
    }

    fn mock_of(store: &KeyringCredentialStore) -> &MockCredential {
        store
            .entry
            .get_credential()
            .downcast_ref::<MockCredential>()
            .expect("mock credential")
    }

    #[test]
    fn test_keyring_store_with_mock_backend() {
        let store = mock_keyring_store();

        assert_eq!(store.get(), None);
        store.set("secret");
        assert_eq!(store.get().as_deref(), Some("secret"));
        assert_eq!(store.entry.get_password().expect("stored").as_str(), "secret");

        store.clear();
        assert_eq!(store.get(), None);
        assert!(matches!(store.entry.get_password(), Err(keyring::Error::NoEntry)));
        store.clear();
    }

    #[test]
    fn test_keyring_store_keeps_token_when_keychain_fails() {
        let store = mock_keyring_store();
        mock_of(&store).set_error(keyring::Error::NoStorageAccess(Box::new(
            std::io::Error::other("keychain locked"),
        )));

        store.set("secret");
        assert_eq!(store.get().as_deref(), Some("secret"));
        assert!(matches!(store.entry.get_password(), Err(keyring::Error::NoEntry)));
    }

    #[test]
    fn test_keyring_store_reads_existing_entry_when_opened() {
        let entry = Entry::new_with_credential(Box::new(MockCredential::default()));
        entry.set_password("from-keychain").expect("seed");

        let store = KeyringCredentialStore::with_entry(entry);
        assert_eq!(store.get().as_deref(), Some("from-keychain"));
    }

    #[test]
    #[ignore = "needs an unlocked OS keychain"]
    fn test_keyring_store_survives_new_instance() {
        let store = KeyringCredentialStore::new().expect("keyring entry");
        store.set("persisted");

        let reopened = KeyringCredentialStore::new().expect("keyring entry");
        assert_eq!(reopened.get().as_deref(), Some("persisted"));

        reopened.clear();
        assert_eq!(KeyringCredentialStore::new().expect("keyring entry").get(), None);
    }
}
