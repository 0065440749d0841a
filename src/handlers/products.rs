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
pub struct ProductListQuery {
    pub category_id: Option<String>,
    pub page: Option<u32>,
    pub search: Option<String>,
}

/// GET /api/products
pub async fn list(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<ProductListQuery>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let mut spec = RequestSpec::get(state.config.paths.products.clone());
    if let Some(category_id) = query.category_id {
        spec = spec.with_query("category_id", category_id);
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

/// GET /api/products/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::get(format!("{}/{}", state.config.paths.products, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: f64,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub warranty_months: Option<u32>,
    pub image: Option<String>,
}

impl ProductForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        if !self.price.is_finite() || self.price < 0.0 {
            errors.add("price", "Price must be zero or more");
        }
        errors.into_result()
    }

    fn body(&self) -> Value {
        json!({
            "name": self.name,
            "price": self.price,
            "category_id": self.category_id,
            "description": self.description,
            "warranty_months": self.warranty_months,
            "image": self.image,
        })
    }
}

/// POST /api/products
pub async fn create(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<ProductForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::post(state.config.paths.products.clone(), form.body());
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::created(data)))
}

/// PUT /api/products/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(form): Json<ProductForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::put(
        format!("{}/{}", state.config.paths.products, id),
        form.body(),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

/// DELETE /api/products/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::delete(format!("{}/{}", state.config.paths.products, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}
