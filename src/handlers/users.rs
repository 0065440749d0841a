//! Admin-portal user management. All authority checks happen upstream; the
//! route guard only controls page visibility, so the backend re-checks the
//! caller's role on every one of these.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::RequestSpec;
use crate::error::{ApiError, GatewayError};
use crate::response::ApiResponse;
use crate::state::AppState;

use super::{forward, FieldErrors};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub page: Option<u32>,
    pub search: Option<String>,
}

/// GET /api/users
pub async fn list(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<UserListQuery>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let mut spec = RequestSpec::get(state.config.paths.users.clone());
    if let Some(role) = query.role {
        spec = spec.with_query("role", role);
    }
    if let Some(page) = query.page {
        spec = spec.with_query("page", page.to_string());
    }
    if let Some(search) = query.search {
        spec = spec.with_query("search", search);
    }
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

/// GET /api/users/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::get(format!("{}/{}", state.config.paths.users, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub suspended: Option<bool>,
}

impl UpdateUserForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.require("name", name);
        }
        if let Some(email) = &self.email {
            errors.require_email("email", email);
        }
        errors.into_result()
    }
}

/// PATCH /api/users/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(form): Json<UpdateUserForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::patch(
        format!("{}/{}", state.config.paths.users, id),
        json!({
            "name": form.name,
            "email": form.email,
            "role": form.role,
            "suspended": form.suspended,
        }),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

/// DELETE /api/users/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::delete(format!("{}/{}", state.config.paths.users, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}
