//! HTTP client for the core backend API.
//!
//! Every request attaches the session's access token as a bearer credential
//! when a session exists. A single 401 triggers exactly one refresh exchange
//! and one reissue of the original request; the attempt state makes the cap
//! structural rather than a mutable retry flag. Concurrent requests that both
//! hit an expired access token will each refresh independently; the backend's
//! refresh issuance is idempotent and no coordination is attempted here.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::session::Session;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no refresh token available for retry")]
    NoRefreshToken,
    #[error("token refresh rejected by the backend: {0}")]
    RefreshRejected(String),
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

/// Per-request retry state. A request is reissued at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retried,
}

/// A forwardable request: method, backend path, query and optional JSON
/// body. Kept as plain data so the client can rebuild and reissue it after a
/// token refresh.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path, Some(body))
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path, Some(body))
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path, Some(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path, None)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Token pair returned by the backend's refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// A backend response plus the refresh outcome. `refreshed` is set when the
/// request only went through after a token refresh; the handler must
/// re-issue the session cookie with the new pair.
#[derive(Debug)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: Value,
    pub refreshed: Option<TokenPair>,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Upstream error message, when the body carries one.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Payload portion of the body. The backend wraps payloads in a `data`
    /// field; bare bodies pass through unchanged.
    pub fn data(&self) -> Value {
        self.body
            .get("data")
            .cloned()
            .unwrap_or_else(|| self.body.clone())
    }
}

pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    refresh_path: String,
}

impl BackendClient {
    pub fn new(mut base_url: Url, refresh_path: impl Into<String>) -> Self {
        // Url::join drops the last path segment of a base without a trailing
        // slash, which silently rewrites sub-path backends.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            refresh_path: refresh_path.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Issue a request on behalf of the given session. No session means the
    /// request goes out unauthenticated; rejecting it is the backend's job.
    pub async fn send(
        &self,
        spec: &RequestSpec,
        session: Option<&Session>,
    ) -> Result<BackendResponse, ClientError> {
        let mut access_token = session.map(|s| s.access_token.clone());
        let mut refreshed: Option<TokenPair> = None;
        let mut attempt = Attempt::First;

        loop {
            let response = self.dispatch(spec, access_token.as_deref()).await?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == Attempt::First {
                if let Some(session) = session {
                    tracing::debug!(path = %spec.path, "access token rejected, attempting refresh");
                    let pair = self.refresh(&session.refresh_token).await?;
                    access_token = Some(pair.access_token.clone());
                    refreshed = Some(pair);
                    attempt = Attempt::Retried;
                    continue;
                }
            }

            let status = response.status();
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Ok(BackendResponse {
                status,
                body,
                refreshed,
            });
        }
    }

    async fn dispatch(
        &self,
        spec: &RequestSpec,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.endpoint(&spec.path)?;
        let mut builder = self
            .http
            .request(spec.method.clone(), url)
            .header("x-request-id", Uuid::new_v4().to_string());
        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        Ok(builder.send().await?)
    }

    /// Exchange a refresh token for a new token pair. A failed exchange
    /// propagates to the caller unchanged; there is no second attempt.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        if refresh_token.is_empty() {
            return Err(ClientError::NoRefreshToken);
        }

        let url = self.endpoint(&self.refresh_path)?;
        let response = self
            .http
            .post(url)
            .header("x-request-id", Uuid::new_v4().to_string())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("token refresh failed")
                .to_string();
            return Err(ClientError::RefreshRejected(message));
        }

        let body = response.json::<Value>().await?;
        let payload = body.get("data").cloned().unwrap_or(body);
        serde_json::from_value(payload)
            .map_err(|_| ClientError::RefreshRejected("malformed refresh response".to_string()))
    }

    /// Multipart passthrough for file uploads. Parts are buffered so the
    /// request can be rebuilt for the one-shot retry, same as `send`.
    pub async fn send_multipart(
        &self,
        path: &str,
        parts: &[UploadPart],
        session: Option<&Session>,
    ) -> Result<BackendResponse, ClientError> {
        let mut access_token = session.map(|s| s.access_token.clone());
        let mut refreshed: Option<TokenPair> = None;
        let mut attempt = Attempt::First;

        loop {
            let url = self.endpoint(path)?;
            let mut form = reqwest::multipart::Form::new();
            for part in parts {
                let mut piece = reqwest::multipart::Part::bytes(part.bytes.clone());
                if let Some(content_type) = &part.content_type {
                    // An unparsable content type degrades to octet-stream.
                    piece = piece
                        .mime_str(content_type)
                        .unwrap_or_else(|_| reqwest::multipart::Part::bytes(part.bytes.clone()));
                }
                if let Some(file_name) = &part.file_name {
                    piece = piece.file_name(file_name.clone());
                }
                form = form.part(part.name.clone(), piece);
            }

            let mut builder = self
                .http
                .post(url)
                .header("x-request-id", Uuid::new_v4().to_string())
                .multipart(form);
            if let Some(token) = access_token.as_deref() {
                builder = builder.bearer_auth(token);
            }
            let response = builder.send().await?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == Attempt::First {
                if let Some(session) = session {
                    let pair = self.refresh(&session.refresh_token).await?;
                    access_token = Some(pair.access_token.clone());
                    refreshed = Some(pair);
                    attempt = Attempt::Retried;
                    continue;
                }
            }

            let status = response.status();
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Ok(BackendResponse {
                status,
                body,
                refreshed,
            });
        }
    }
}

/// A buffered multipart field, reusable across the retry.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
