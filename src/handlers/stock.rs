use std::sync::Arc;

use axum::{
    extract::{Query, State},
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
pub struct StockListQuery {
    pub product_id: Option<String>,
    pub low_only: Option<bool>,
}

/// GET /api/stock
pub async fn list(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<StockListQuery>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let mut spec = RequestSpec::get(state.config.paths.stock.clone());
    if let Some(product_id) = query.product_id {
        spec = spec.with_query("product_id", product_id);
    }
    if query.low_only.unwrap_or(false) {
        spec = spec.with_query("low_only", "true");
    }
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

/// A signed stock movement. Positive deltas receive stock, negative ones
/// write it off; zero is meaningless and rejected.
#[derive(Debug, Deserialize)]
pub struct StockAdjustmentForm {
    pub product_id: String,
    pub delta: i64,
    pub reason: String,
}

impl StockAdjustmentForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("product_id", &self.product_id);
        errors.require("reason", &self.reason);
        if self.delta == 0 {
            errors.add("delta", "Adjustment cannot be zero");
        }
        errors.into_result()
    }
}

/// POST /api/stock/adjustments
pub async fn adjust(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<StockAdjustmentForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;
    let spec = RequestSpec::post(
        format!("{}/adjustments", state.config.paths.stock),
        json!({
            "product_id": form.product_id,
            "delta": form.delta,
            "reason": form.reason,
        }),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::created(data)))
}
