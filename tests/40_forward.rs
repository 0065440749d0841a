//! Forwarded actions re-issue the session cookie whenever the backend client
//! refreshed tokens mid-request, including when the retried request fails.

mod common;

use anyhow::Result;
use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use storefront_gateway::app;
use storefront_gateway::auth;
use storefront_gateway::config::AppKind;
use storefront_gateway::session::Role;

/// Stub backend that rotates the token pair on refresh. /orders accepts only
/// the rotated access token; /stock rejects every token it sees.
fn rotating_backend() -> Router {
    Router::new()
        .route(
            "/orders",
            get(|headers: HeaderMap| async move {
                let bearer = headers
                    .get("authorization")
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("");
                if bearer == "Bearer fresh-access" {
                    (StatusCode::OK, Json(json!({ "data": [{ "id": "o-1" }] })))
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "message": "token expired" })),
                    )
                }
            }),
        )
        .route(
            "/stock",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "token expired" })),
                )
            }),
        )
        .route(
            "/auth/refresh",
            post(|Json(body): Json<Value>| async move {
                if body["refresh_token"] == "rt-test" {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "data": {
                                "access_token": "fresh-access",
                                "refresh_token": "fresh-refresh",
                            }
                        })),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "message": "refresh denied" })),
                    )
                }
            }),
        )
}

async fn gateway() -> Result<String> {
    let backend = common::spawn(rotating_backend()).await?;
    common::spawn(app(common::gateway_state(AppKind::Shop, &backend))).await
}

#[tokio::test]
async fn successful_retry_rotates_the_session_cookie() -> Result<()> {
    let base = gateway().await?;
    let session = common::session(Role::ShopOwner);

    let response = common::client()
        .get(format!("{}/api/orders", base))
        .header("cookie", common::cookie_header(&session))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let token = common::set_cookie_value(&response, "session").expect("session cookie");
    let claims = auth::verify(&token, common::SECRET)?;
    assert_eq!(claims.session.access_token, "fresh-access");
    assert_eq!(claims.session.refresh_token, "fresh-refresh");
    assert_eq!(claims.session.user, session.user);
    Ok(())
}

#[tokio::test]
async fn failing_retry_still_rotates_the_session_cookie() -> Result<()> {
    let base = gateway().await?;
    let session = common::session(Role::ShopOwner);

    // Refresh succeeds, the reissued request is still rejected. The rotated
    // pair must reach the browser anyway or the next request carries a
    // refresh token the backend already consumed.
    let response = common::client()
        .get(format!("{}/api/stock", base))
        .header("cookie", common::cookie_header(&session))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let token = common::set_cookie_value(&response, "session").expect("session cookie");
    let claims = auth::verify(&token, common::SECRET)?;
    assert_eq!(claims.session.access_token, "fresh-access");
    assert_eq!(claims.session.refresh_token, "fresh-refresh");

    let body: Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "token expired");
    Ok(())
}
