use std::sync::Arc;

use storefront_gateway::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up BACKEND_BASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // A gateway with no backend address, app kind or signing secret must
    // not come up at all.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;
    let app_kind = config.app;
    let state = Arc::new(AppState::new(config));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("storefront gateway ({:?}) listening on http://{}", app_kind, bind_addr);

    axum::serve(listener, app(state)).await.expect("server");
}
