use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - credential rejected")]
    AuthenticationFailed,

    #[error("Request rejected ({status}): {message}")]
    ClientRejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pick the message to show for a rejected request: the JSON `message`
    /// field, then the raw body, then the status description.
    fn extract_message(status: StatusCode, body: &str) -> String {
        if let Ok(ErrorBody { message: Some(message) }) = serde_json::from_str::<ErrorBody>(body) {
            if !message.trim().is_empty() {
                return message;
            }
        }

        let trimmed = body.trim();
        if !trimmed.is_empty() {
            return Self::truncate_body(trimmed);
        }

        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
    }

    /// Classify a non-success response.
    ///
    /// A 401 is an authentication failure only when a credential was sent
    /// with the request. Without one (a sign-in attempt) it is an ordinary
    /// rejection carrying the server's message.
    pub fn from_status(status: StatusCode, body: &str, credentialed: bool) -> Self {
        if status == StatusCode::UNAUTHORIZED && credentialed {
            return ApiError::AuthenticationFailed;
        }
        ApiError::ClientRejected {
            status: status.as_u16(),
            message: Self::extract_message(status, body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthenticationFailed => Some(401),
            ApiError::ClientRejected { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) | ApiError::InvalidRequest(_) => None,
        }
    }

    /// Whether the same request may succeed if sent again unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::ClientRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Inline message for a screen, falling back to `fallback` when the
    /// server gave nothing better.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::ClientRejected { message, .. } if !message.is_empty() => message.clone(),
            ApiError::AuthenticationFailed => "Session expired. Please log in again.".to_string(),
            ApiError::Transport(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Transport(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            _ => fallback.to_string(),
        }
    }
}
