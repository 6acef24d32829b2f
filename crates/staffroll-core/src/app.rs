//! Application wiring for staffroll.
//!
//! `App` owns the credential store, the session manager, and the request
//! pipeline, and connects them: the session manager is the pipeline's
//! authentication-failure handler, so a rejected token ends the session no
//! matter which screen sent the request.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};
use crate::auth::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore, Session,
    SessionManager,
};
use crate::config::{Config, CredentialBackend};
use crate::guard::RouteGuard;

pub struct App {
    config: Config,
    session: SessionManager,
    api: ApiClient,
}

impl App {
    /// Load configuration from disk and the environment, then build the app
    pub fn from_env() -> Result<Self> {
        let config = Config::load()?;
        Self::new(config)
    }

    pub fn new(config: Config) -> Result<Self> {
        let credentials = Self::credential_store(&config)?;
        Self::with_credentials(config, credentials)
    }

    /// Build the app around an existing credential store
    pub fn with_credentials(config: Config, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        config.validate()?;

        let session = SessionManager::new(credentials.clone());
        debug!(authenticated = session.is_authenticated(), "Session restored");

        let api = ApiClient::new(&config, credentials, Arc::new(session.clone()))
            .context("Failed to build API client")?;

        Ok(Self {
            config,
            session,
            api,
        })
    }

    fn credential_store(config: &Config) -> Result<Arc<dyn CredentialStore>> {
        let store: Arc<dyn CredentialStore> = match config.credential_backend {
            CredentialBackend::File => Arc::new(FileCredentialStore::new(&config.data_dir()?)),
            CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new()?),
            CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
        };
        debug!(backend = ?config.credential_backend, "Credential store ready");
        Ok(store)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn current_session(&self) -> Session {
        self.session.current_session()
    }

    /// A guard for one view; the sign-in and sign-up paths are public.
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(
            &self.session,
            self.config.sign_in_path.clone(),
            [self.config.sign_up_path.clone()],
        )
    }

    /// Authenticate and start the session. On failure the session is untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let token = self.api.authenticate(email, password).await?;
        self.session.login(token);
        info!("Signed in");
        Ok(())
    }

    pub fn sign_out(&self) {
        self.session.logout();
    }
}
