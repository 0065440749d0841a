//! Page-namespace handlers: the liveness probe, the document shell the
//! portals bootstrap from, and the sidebar layout flag.

use std::sync::Arc;

use axum::{
    extract::State,
    http::Uri,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::session::shop;

use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Fallback for every guarded page path. By the time this runs the route
/// guard has already decided the caller may be here; the shell just tells
/// the front-end bundle where to boot from.
pub async fn page_shell(State(state): State<Arc<AppState>>, uri: Uri) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "app": state.config.app,
        "path": uri.path(),
        "assets": state.config.asset_base_url,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SidebarForm {
    pub open: bool,
}

/// POST /api/layout/sidebar
///
/// Persists the sidebar flag in a client-readable cookie so the first paint
/// matches the last layout. Carries no security state.
pub async fn set_sidebar(
    jar: CookieJar,
    Json(form): Json<SidebarForm>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let jar = shop::sidebar_state(jar, form.open);
    Ok((jar, ApiResponse::success(json!({ "open": form.open }))))
}
