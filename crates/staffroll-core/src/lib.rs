//! staffroll-core - client-side session core for the staffroll employee directory.
//!
//! Tracks whether the user is signed in, keeps the bearer token in a durable
//! credential store, attaches it to every backend request, ends the session
//! when the backend rejects it, and gates protected views.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! let app = staffroll_core::App::from_env()?;
//! app.sign_in("ada@example.com", "hunter22").await?;
//! let employees = app.api().list_employees().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;

pub use api::{ApiClient, ApiError, ApiRequest, ApiResponse, AuthFailureHandler};
pub use app::App;
pub use auth::{CredentialStore, Session, SessionManager, SessionStatus};
pub use config::{Config, CredentialBackend};
pub use guard::{Navigation, RouteGuard};
