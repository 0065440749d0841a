use std::sync::Arc;

use axum::{
    extract::{Path, State},
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

/// GET /api/categories
pub async fn list(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::get(state.config.paths.categories.clone());
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub icon: Option<String>,
}

impl CategoryForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.into_result()
    }
}

/// POST /api/categories
pub async fn create(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<CategoryForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::post(
        state.config.paths.categories.clone(),
        json!({ "name": form.name, "icon": form.icon }),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::created(data)))
}

/// PUT /api/categories/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(form): Json<CategoryForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::put(
        format!("{}/{}", state.config.paths.categories, id),
        json!({ "name": form.name, "icon": form.icon }),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

/// DELETE /api/categories/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::delete(format!("{}/{}", state.config.paths.categories, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}
