//! Login, logout and session-cookie behaviour through the gateway.

mod common;

use anyhow::Result;
use axum::{
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use storefront_gateway::app;
use storefront_gateway::auth;
use storefront_gateway::config::AppKind;
use storefront_gateway::session::Role;

/// Stub auth backend. Password is always "secret"; the account's role comes
/// from the mailbox name (admin@, customer@, owner@).
fn auth_backend() -> Router {
    Router::new()
        .route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                let email = body["email"].as_str().unwrap_or("");
                if body["password"] != "secret" {
                    return (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "message": "Invalid email or password" })),
                    );
                }
                let role = match email.split('@').next() {
                    Some("admin") => "ADMIN",
                    Some("owner") => "SHOP_OWNER",
                    _ => "CUSTOMER",
                };
                (
                    StatusCode::OK,
                    Json(json!({
                        "data": {
                            "user": {
                                "id": "u-1",
                                "name": "Backend User",
                                "email": email,
                                "role": role,
                            },
                            "access_token": "at-1",
                            "refresh_token": "rt-1",
                        }
                    })),
                )
            }),
        )
        .route(
            "/auth/logout",
            post(|| async { Json(json!({ "data": { "signed_out": true } })) }),
        )
}

async fn gateway(kind: AppKind) -> Result<String> {
    let backend = common::spawn(auth_backend()).await?;
    common::spawn(app(common::gateway_state(kind, &backend))).await
}

#[tokio::test]
async fn login_issues_a_verifiable_session_cookie() -> Result<()> {
    let base = gateway(AppKind::Admin).await?;

    let response = common::client()
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": "admin@example.com", "password": "secret" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let token = common::set_cookie_value(&response, "session").expect("session cookie");
    let claims = auth::verify(&token, common::SECRET)?;
    assert_eq!(claims.session.user.role, Role::Admin);
    assert_eq!(claims.session.access_token, "at-1");
    assert_eq!(claims.session.refresh_token, "rt-1");

    let body: Value = response.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "admin@example.com");
    Ok(())
}

#[tokio::test]
async fn wrong_portal_role_rejected_like_bad_credentials() -> Result<()> {
    let base = gateway(AppKind::Admin).await?;

    // Valid customer credentials, but on the admin portal.
    let response = common::client()
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": "customer@example.com", "password": "secret" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(common::set_cookie_value(&response, "session").is_none());
    let body: Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email or password");
    Ok(())
}

#[tokio::test]
async fn wrong_password_surfaces_backend_message() -> Result<()> {
    let base = gateway(AppKind::Admin).await?;

    let response = common::client()
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": "admin@example.com", "password": "nope" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Invalid email or password");
    Ok(())
}

#[tokio::test]
async fn malformed_email_fails_validation_before_the_backend() -> Result<()> {
    let base = gateway(AppKind::Admin).await?;

    let response = common::client()
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": "not-an-email", "password": "secret" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert!(body["field_errors"]["email"].is_string());
    Ok(())
}

#[tokio::test]
async fn me_requires_a_session() -> Result<()> {
    let base = gateway(AppKind::Shop).await?;
    let client = common::client();

    let anonymous = client.get(format!("{}/api/auth/me", base)).send().await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let session = common::session(Role::ShopOwner);
    let signed_in = client
        .get(format!("{}/api/auth/me", base))
        .header("cookie", common::cookie_header(&session))
        .send()
        .await?;
    assert_eq!(signed_in.status(), StatusCode::OK);
    let body: Value = signed_in.json().await?;
    assert_eq!(body["data"]["user"]["email"], "user@example.com");
    assert_eq!(body["data"]["user"]["role"], "SHOP_OWNER");
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_cookie_and_tolerates_no_session() -> Result<()> {
    let base = gateway(AppKind::Shop).await?;
    let client = common::client();

    let session = common::session(Role::ShopOwner);
    let response = client
        .post(format!("{}/api/auth/logout", base))
        .header("cookie", common::cookie_header(&session))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        common::set_cookie_value(&response, "session").as_deref(),
        Some("")
    );

    // No session at all is still a clean sign-out.
    let bare = client.post(format!("{}/api/auth/logout", base)).send().await?;
    assert_eq!(bare.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn selected_shop_defaults_from_the_session() -> Result<()> {
    let base = gateway(AppKind::Shop).await?;

    let session = common::session_with(Role::ShopOwner, Some("shop-7"));
    let response = common::client()
        .get(format!("{}/api/shop/selected", base))
        .header("cookie", common::cookie_header(&session))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    // The default is persisted so later requests agree with this one.
    assert_eq!(
        common::set_cookie_value(&response, "selected-shop").as_deref(),
        Some("shop-7")
    );
    let body: Value = response.json().await?;
    assert_eq!(body["data"]["shop_id"], "shop-7");
    Ok(())
}
