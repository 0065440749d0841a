//! Backend client retry semantics: exactly one refresh, exactly one reissue.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use url::Url;

use storefront_gateway::client::{BackendClient, ClientError, RequestSpec, TokenPair};
use storefront_gateway::session::Role;

#[derive(Default)]
struct Counters {
    protected: AtomicUsize,
    refresh: AtomicUsize,
}

/// Stub backend: /protected accepts only the refreshed access token (when
/// `accept_fresh` is set); /auth/refresh exchanges "rt-test" for a fresh
/// pair (when `refresh_ok` is set).
fn stub_backend(counters: Arc<Counters>, refresh_ok: bool, accept_fresh: bool) -> Router {
    let protected_counters = counters.clone();
    let refresh_counters = counters;

    Router::new()
        .route(
            "/protected",
            get(move |headers: HeaderMap| {
                let counters = protected_counters.clone();
                async move {
                    counters.protected.fetch_add(1, Ordering::SeqCst);
                    let auth = headers
                        .get("authorization")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("");
                    if accept_fresh && auth == "Bearer fresh-access" {
                        (StatusCode::OK, Json(json!({ "data": { "ok": true } })))
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({ "message": "token expired" })),
                        )
                    }
                }
            }),
        )
        .route(
            "/auth/refresh",
            post(move |Json(body): Json<Value>| {
                let counters = refresh_counters.clone();
                async move {
                    counters.refresh.fetch_add(1, Ordering::SeqCst);
                    if refresh_ok && body["refresh_token"] == "rt-test" {
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
                }
            }),
        )
}

fn client_for(base_url: &str) -> BackendClient {
    BackendClient::new(Url::parse(base_url).expect("base url"), "/auth/refresh")
}

#[tokio::test]
async fn refresh_then_retry_succeeds() -> Result<()> {
    let counters = Arc::new(Counters::default());
    let base = common::spawn(stub_backend(counters.clone(), true, true)).await?;

    let session = common::session(Role::ShopOwner);
    let response = client_for(&base)
        .send(&RequestSpec::get("/protected"), Some(&session))
        .await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.refreshed,
        Some(TokenPair {
            access_token: "fresh-access".to_string(),
            refresh_token: "fresh-refresh".to_string(),
        })
    );
    assert_eq!(counters.protected.load(Ordering::SeqCst), 2);
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn second_rejection_surfaces_instead_of_looping() -> Result<()> {
    let counters = Arc::new(Counters::default());
    // Refresh succeeds, but the endpoint keeps rejecting.
    let base = common::spawn(stub_backend(counters.clone(), true, false)).await?;

    let session = common::session(Role::ShopOwner);
    let response = client_for(&base)
        .send(&RequestSpec::get("/protected"), Some(&session))
        .await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), Some("token expired"));
    // One original attempt, one retry, no third.
    assert_eq!(counters.protected.load(Ordering::SeqCst), 2);
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn failed_refresh_propagates_unchanged() -> Result<()> {
    let counters = Arc::new(Counters::default());
    let base = common::spawn(stub_backend(counters.clone(), false, true)).await?;

    let session = common::session(Role::ShopOwner);
    let err = client_for(&base)
        .send(&RequestSpec::get("/protected"), Some(&session))
        .await
        .unwrap_err();

    match err {
        ClientError::RefreshRejected(message) => assert_eq!(message, "refresh denied"),
        other => panic!("expected RefreshRejected, got {:?}", other),
    }
    assert_eq!(counters.protected.load(Ordering::SeqCst), 1);
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn no_session_passes_401_through_without_refresh() -> Result<()> {
    let counters = Arc::new(Counters::default());
    let base = common::spawn(stub_backend(counters.clone(), true, true)).await?;

    let response = client_for(&base)
        .send(&RequestSpec::get("/protected"), None)
        .await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.refreshed.is_none());
    assert_eq!(counters.protected.load(Ordering::SeqCst), 1);
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn missing_refresh_token_is_a_hard_failure() -> Result<()> {
    let counters = Arc::new(Counters::default());
    let base = common::spawn(stub_backend(counters.clone(), true, true)).await?;

    let mut session = common::session(Role::ShopOwner);
    session.refresh_token = String::new();
    let err = client_for(&base)
        .send(&RequestSpec::get("/protected"), Some(&session))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NoRefreshToken));
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 0);
    Ok(())
}
