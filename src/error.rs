// HTTP API error types surfaced by the gateway's own endpoints.
use std::collections::HashMap;

use axum::{http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};

use crate::client::ClientError;
use crate::session::SessionError;

/// Client-facing error with an HTTP status and a human-readable message.
/// Validation failures additionally carry a per-field error map so forms can
/// render inline messages.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    BadGateway(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg)
            | ApiError::BadGateway(msg) => msg,
            ApiError::Validation { message, .. } => message,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code(),
        });
        if let ApiError::Validation { field_errors, .. } = self {
            if !field_errors.is_empty() {
                body["field_errors"] = json!(field_errors);
            }
        }
        body
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    /// Translate a non-2xx backend response into the gateway's error shape,
    /// preferring the upstream `message` field when present.
    pub fn from_upstream(status: StatusCode, message: Option<&str>) -> Self {
        let msg = message.unwrap_or("Something went wrong").to_string();
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::BadRequest(msg),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(msg),
            StatusCode::FORBIDDEN => ApiError::Forbidden(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::CONFLICT => ApiError::Conflict(msg),
            s if s.is_server_error() => ApiError::BadGateway(msg),
            _ => ApiError::BadRequest(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoSession => {
                ApiError::unauthorized("You must be signed in to do that")
            }
            SessionError::Token(e) => {
                tracing::warn!("session token error: {}", e);
                ApiError::unauthorized("Session is no longer valid. Please sign in again.")
            }
        }
    }
}

/// Handler failure that carries the request's cookie jar. Cookie changes
/// made before the failure (a rotated token pair, a discarded bad cookie)
/// have to ride on the error response or the browser keeps stale state.
pub struct GatewayError {
    pub jar: Option<CookieJar>,
    pub error: ApiError,
}

impl GatewayError {
    pub fn with_jar(jar: CookieJar, error: ApiError) -> Self {
        Self {
            jar: Some(jar),
            error,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        match self.jar {
            Some(jar) => (jar, self.error).into_response(),
            None => self.error.into_response(),
        }
    }
}

impl From<ApiError> for GatewayError {
    fn from(error: ApiError) -> Self {
        Self { jar: None, error }
    }
}

impl From<SessionError> for GatewayError {
    fn from(err: SessionError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NoRefreshToken | ClientError::RefreshRejected(_) => {
                tracing::debug!("refresh exhausted: {}", err);
                ApiError::unauthorized("Session expired. Please sign in again.")
            }
            ClientError::Transport(e) => {
                tracing::error!("backend request failed: {}", e);
                ApiError::bad_gateway("The service is temporarily unavailable")
            }
            ClientError::Url(e) => {
                tracing::error!("backend url construction failed: {}", e);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_is_preserved() {
        let err = ApiError::from_upstream(StatusCode::CONFLICT, Some("Email already in use"));
        assert_eq!(err.message(), "Email already in use");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn upstream_without_message_uses_fallback() {
        let err = ApiError::from_upstream(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err.message(), "Something went wrong");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_body_carries_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("email".to_string(), "Invalid email".to_string());
        let body = ApiError::validation("Check the form", fields).to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["field_errors"]["email"], "Invalid email");
    }
}
