pub mod auth;
pub mod cashflow;
pub mod categories;
pub mod employees;
pub mod files;
pub mod orders;
pub mod pages;
pub mod products;
pub mod shop;
pub mod stock;
pub mod suppliers;
pub mod users;

use axum_extra::extract::CookieJar;
use serde_json::Value;
use std::collections::HashMap;

use crate::client::{RequestSpec, TokenPair};
use crate::error::{ApiError, GatewayError};
use crate::session::SessionStore;
use crate::state::AppState;

/// Persist a mid-request token refresh to the session cookie. Runs before
/// the upstream status is inspected: a refresh that preceded a failing
/// retry is still a refresh worth keeping.
pub(crate) fn commit_refreshed(
    store: &SessionStore,
    jar: CookieJar,
    refreshed: Option<TokenPair>,
) -> Result<CookieJar, ApiError> {
    match refreshed {
        Some(pair) => Ok(store.update_tokens(jar, pair.access_token, pair.refresh_token)?),
        None => Ok(jar),
    }
}

/// The standard thin-action shape: read the session, forward the request,
/// persist any refreshed tokens, translate the outcome. Failures carry the
/// jar, so a cookie rotated along the way still reaches the browser even
/// when the upstream status surfaces as an error.
pub(crate) async fn forward(
    state: &AppState,
    jar: CookieJar,
    spec: RequestSpec,
) -> Result<(CookieJar, Value), GatewayError> {
    let (jar, session) = state.sessions.get(jar);
    let response = match state.backend.send(&spec, session.as_ref()).await {
        Ok(response) => response,
        Err(e) => return Err(GatewayError::with_jar(jar, e.into())),
    };
    let jar = commit_refreshed(&state.sessions, jar, response.refreshed.clone())?;
    if response.is_success() {
        Ok((jar, response.data()))
    } else {
        Err(GatewayError::with_jar(
            jar,
            ApiError::from_upstream(response.status, response.message()),
        ))
    }
}

/// Accumulator for form validation. Mirrors the structured error shape the
/// portals render inline: one message per offending field, never a panic.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "This field is required");
        }
    }

    pub fn require_email(&mut self, field: &str, value: &str) {
        self.require(field, value);
        if !value.trim().is_empty() && !value.contains('@') {
            self.add(field, "Invalid email address");
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Please correct the highlighted fields", self.0))
        }
    }
}
