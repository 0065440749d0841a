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
pub struct OrderListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub search: Option<String>,
}

/// GET /api/orders
pub async fn list(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<OrderListQuery>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let mut spec = RequestSpec::get(state.config.paths.orders.clone());
    if let Some(status) = query.status {
        spec = spec.with_query("status", status);
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

/// GET /api/orders/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::get(format!("{}/{}", state.config.paths.orders, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct OrderItemForm {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderForm {
    pub shop_id: Option<String>,
    pub items: Vec<OrderItemForm>,
    pub note: Option<String>,
}

impl CreateOrderForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if self.items.is_empty() {
            errors.add("items", "An order needs at least one item");
        }
        for (idx, item) in self.items.iter().enumerate() {
            if item.product_id.trim().is_empty() {
                errors.add(&format!("items.{}.product_id", idx), "This field is required");
            }
            if item.quantity == 0 {
                errors.add(&format!("items.{}.quantity", idx), "Quantity must be at least 1");
            }
        }
        errors.into_result()
    }
}

/// POST /api/orders
pub async fn create(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<CreateOrderForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let items: Vec<Value> = form
        .items
        .iter()
        .map(|i| json!({ "product_id": i.product_id, "quantity": i.quantity }))
        .collect();
    let spec = RequestSpec::post(
        state.config.paths.orders.clone(),
        json!({ "shop_id": form.shop_id, "items": items, "note": form.note }),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::created(data)))
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusForm {
    pub status: String,
}

/// PATCH /api/orders/:id/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(form): Json<OrderStatusForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let mut errors = FieldErrors::new();
    errors.require("status", &form.status);
    errors.into_result()?;

    let spec = RequestSpec::patch(
        format!("{}/{}/status", state.config.paths.orders, id),
        json!({ "status": form.status }),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}
