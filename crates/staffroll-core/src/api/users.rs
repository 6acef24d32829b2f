//! Account endpoints: sign in and sign up.

use tracing::info;

use crate::models::{LoginRequest, LoginResponse, SignupRequest};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Exchange email and password for a bearer token.
    ///
    /// Bad credentials come back as `ClientRejected { status: 401, .. }`
    /// when no session is active; the message is the server's.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let response: LoginResponse = self
            .post("/users/login", &LoginRequest { email, password })
            .await?;

        if response.token.trim().is_empty() {
            return Err(ApiError::InvalidResponse(
                "Login response did not contain a token".to_string(),
            ));
        }
        info!("Authentication succeeded");
        Ok(response.token)
    }

    /// Register a new account. Does not sign in.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError> {
        self.post_discard("/users/signup", &SignupRequest { name, email, password })
            .await?;
        info!("Signup succeeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::auth::{MemoryCredentialStore, SessionManager};
    use crate::config::Config;

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn signed_out_client(uri: &str) -> (ApiClient, SessionManager) {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = SessionManager::new(store.clone());
        let config = Config {
            api_base_url: uri.to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, store, Arc::new(session.clone())).expect("client");
        (client, session)
    }

    #[tokio::test]
    async fn test_authenticate_returns_token() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .and(body_json(json!({"email": "ada@example.com", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-123"})))
            .mount(&server)
            .await;

        let (client, _) = signed_out_client(&server.uri());
        let token = client
            .authenticate("ada@example.com", "hunter22")
            .await
            .expect("login");
        assert_eq!(token, "jwt-123");
    }

    #[tokio::test]
    async fn test_bad_password_is_a_login_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid email or password"})))
            .mount(&server)
            .await;

        let (client, session) = signed_out_client(&server.uri());
        let rx = session.subscribe();

        let err = client
            .authenticate("ada@example.com", "wrong")
            .await
            .expect_err("rejected");
        assert!(matches!(err, ApiError::ClientRejected { status: 401, .. }));
        assert_eq!(
            err.user_message("Login failed. Please check your credentials."),
            "Invalid email or password"
        );
        assert!(!session.is_authenticated());
        assert!(!rx.has_changed().expect("sender alive"));
    }

    #[tokio::test]
    async fn test_empty_token_is_invalid_response() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": ""})))
            .mount(&server)
            .await;

        let (client, _) = signed_out_client(&server.uri());
        let err = client.authenticate("a@b.c", "pw").await.expect_err("empty token");
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_sign_up_ignores_body_and_surfaces_conflict() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/signup"))
            .and(body_json(json!({"name": "Ada", "email": "ada@example.com", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/users/signup"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "User already exists"})))
            .mount(&server)
            .await;

        let (client, _) = signed_out_client(&server.uri());
        client
            .sign_up("Ada", "ada@example.com", "hunter22")
            .await
            .expect("signup");

        let err = client
            .sign_up("Ada", "ada@example.com", "hunter22")
            .await
            .expect_err("duplicate");
        assert_eq!(err.user_message("Signup failed. Please try again."), "User already exists");
    }
}
