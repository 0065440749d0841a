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

/// GET /api/employees
pub async fn list(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::get(state.config.paths.employees.clone());
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct EmployeeForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl EmployeeForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.require_email("email", &self.email);
        errors.into_result()
    }

    fn body(&self) -> Value {
        json!({ "name": self.name, "email": self.email, "phone": self.phone })
    }
}

/// POST /api/employees
pub async fn create(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<EmployeeForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::post(state.config.paths.employees.clone(), form.body());
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::created(data)))
}

/// PUT /api/employees/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(form): Json<EmployeeForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::put(
        format!("{}/{}", state.config.paths.employees, id),
        form.body(),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

/// DELETE /api/employees/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::delete(format!("{}/{}", state.config.paths.employees, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}
