#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use url::Url;

use storefront_gateway::auth::{sign, Claims};
use storefront_gateway::config::{AppConfig, AppKind, BackendPaths};
use storefront_gateway::session::{Role, Session, SessionUser};
use storefront_gateway::state::AppState;

pub const SECRET: &str = "integration-secret";

/// Bind a router to an ephemeral port and serve it for the rest of the test
/// process. Used both for stub backends and for the gateway under test.
pub async fn spawn(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    Ok(format!("http://{}", addr))
}

pub fn gateway_state(app: AppKind, backend_url: &str) -> Arc<AppState> {
    let config = AppConfig {
        app,
        backend_base_url: Url::parse(backend_url).expect("backend url"),
        session_secret: SECRET.to_string(),
        asset_base_url: "/assets".to_string(),
        port: 0,
        paths: BackendPaths::default(),
    };
    Arc::new(AppState::new(config))
}

pub fn session_with(role: Role, default_shop_id: Option<&str>) -> Session {
    Session {
        user: SessionUser {
            id: "u-100".to_string(),
            name: "Test User".to_string(),
            email: "user@example.com".to_string(),
            role,
            image: None,
            default_shop_id: default_shop_id.map(String::from),
            shops: vec![],
        },
        access_token: "at-test".to_string(),
        refresh_token: "rt-test".to_string(),
    }
}

pub fn session(role: Role) -> Session {
    session_with(role, None)
}

/// Cookie header value for a signed session, as the browser would send it.
pub fn cookie_header(session: &Session) -> String {
    let token = sign(&Claims::new(session.clone()), SECRET).expect("sign session");
    format!("session={}", token)
}

/// Client that does not follow redirects, so guard decisions are observable.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("reqwest client")
}

/// Pull a named cookie's value out of the Set-Cookie response headers.
pub fn set_cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|h| h.starts_with(&prefix))
        .map(|h| {
            let rest = &h[prefix.len()..];
            rest.split(';').next().unwrap_or("").to_string()
        })
}
