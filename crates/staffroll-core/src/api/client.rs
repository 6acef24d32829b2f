//! API client for the employee directory backend.
//!
//! Every backend call goes through `ApiClient::send`, which attaches the
//! stored bearer token and classifies the response. A 401 on a request that
//! carried a token is reported to the injected `AuthFailureHandler` before the
//! error is returned to the caller.

use std::sync::Arc;

use anyhow::Result;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::CredentialStore;
use crate::config::Config;

use super::ApiError;

/// Receives rejected credentials from the pipeline.
///
/// Called synchronously, once per failed request, with the token that request
/// carried. Implementations must not send requests through the pipeline.
pub trait AuthFailureHandler: Send + Sync {
    fn on_authentication_failed(&self, rejected_token: &str);
}

impl<F> AuthFailureHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_authentication_failed(&self, rejected_token: &str) {
        self(rejected_token)
    }
}

/// A request relative to the configured base address.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

/// The request pipeline.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    on_auth_failure: Arc<dyn AuthFailureHandler>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// `credentials` is only ever read here; `on_auth_failure` is told about
    /// every rejected credential.
    pub fn new(
        config: &Config,
        credentials: Arc<dyn CredentialStore>,
        on_auth_failure: Arc<dyn AuthFailureHandler>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            credentials,
            on_auth_failure,
        })
    }

    /// Send a request and classify the response.
    ///
    /// The credential is read once, at dispatch. A logout while the request is
    /// in flight does not change what it was sent with.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = build_url(&self.base_url, &request.path);
        let token = self.credentials.get();

        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(ref token) = token {
            builder = builder.bearer_auth(token);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            credentialed = token.is_some(),
            "Sending request"
        );

        let response = builder.send().await.map_err(|e| {
            warn!(method = %request.method, path = %request.path, error = %e, "Request failed to complete");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            // The status already decides the outcome of a failed request
            Err(e) if !status.is_success() => {
                debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                String::new()
            }
            Err(e) => return Err(ApiError::Transport(e)),
        };

        if status.is_success() {
            return Ok(ApiResponse { status, body });
        }

        let error = ApiError::from_status(status, &body, token.is_some());
        match (&error, token) {
            (ApiError::AuthenticationFailed, Some(token)) => {
                warn!(method = %request.method, path = %request.path, "Credential rejected");
                self.on_auth_failure.on_authentication_failed(&token);
            }
            _ => {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    status = status.as_u16(),
                    "Request rejected"
                );
            }
        }
        Err(error)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// GET with query parameters. Pairs with blank values are left out.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let mut request = ApiRequest::get(path);
        for (key, value) in query {
            if !value.trim().is_empty() {
                request = request.query(*key, value.trim());
            }
        }
        self.send(request).await?.json()
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::post(path).json(body)?).await?.json()
    }

    /// POST where the response body is not needed
    pub async fn post_discard<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(ApiRequest::post(path).json(body)?).await?;
        Ok(())
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::put(path).json(body)?).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }
}

/// Join the base address and a request path with exactly one slash.
fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}
