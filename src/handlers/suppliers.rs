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

/// GET /api/suppliers
pub async fn list(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::get(state.config.paths.suppliers.clone());
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct SupplierForm {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl SupplierForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        if let Some(email) = &self.email {
            if !email.trim().is_empty() {
                errors.require_email("email", email);
            }
        }
        errors.into_result()
    }

    fn body(&self) -> Value {
        json!({
            "name": self.name,
            "phone": self.phone,
            "email": self.email,
            "address": self.address,
        })
    }
}

/// POST /api/suppliers
pub async fn create(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SupplierForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::post(state.config.paths.suppliers.clone(), form.body());
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::created(data)))
}

/// PUT /api/suppliers/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(form): Json<SupplierForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::put(
        format!("{}/{}", state.config.paths.suppliers, id),
        form.body(),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

/// DELETE /api/suppliers/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::delete(format!("{}/{}", state.config.paths.suppliers, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}
