//! Selected-shop actions (shop portal). The choice lives in its own cookie
//! outside the signed session; the backend re-validates membership on every
//! resource request.

use std::sync::Arc;

use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::session::shop;
use crate::state::AppState;

use super::FieldErrors;

/// GET /api/shop/selected
///
/// Resolves (and persists) the caller's shop choice, defaulting from the
/// session when the cookie is absent.
pub async fn get_selected(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let (jar, session) = state.sessions.get(jar);
    let session = session.ok_or_else(|| ApiError::unauthorized("Not signed in"))?;
    let (jar, shop_id) = shop::selected_shop_id(jar, &session);
    Ok((jar, ApiResponse::success(json!({ "shop_id": shop_id }))))
}

#[derive(Debug, Deserialize)]
pub struct SelectShopForm {
    pub shop_id: String,
}

/// PUT /api/shop/selected
pub async fn put_selected(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SelectShopForm>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let mut errors = FieldErrors::new();
    errors.require("shop_id", &form.shop_id);
    errors.into_result()?;

    let (jar, session) = state.sessions.get(jar);
    session.ok_or_else(|| ApiError::unauthorized("Not signed in"))?;

    let jar = shop::select_shop(jar, &form.shop_id);
    Ok((jar, ApiResponse::success(json!({ "shop_id": form.shop_id }))))
}
