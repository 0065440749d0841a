pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod response;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Assemble the full router: liveness probe, the federated-login callback,
/// the action endpoints under /api, and the guarded page namespace.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::pages::health))
        .route("/auth/callback", get(handlers::auth::oauth_callback))
        .nest("/api", api_routes())
        .fallback(handlers::pages::page_shell)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    use handlers::{
        auth, cashflow, categories, employees, files, orders, pages, products, shop, stock,
        suppliers, users,
    };

    Router::new()
        // Session lifecycle
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", patch(auth::update_profile))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        // Admin portal resources
        .route("/users", get(users::list))
        .route(
            "/users/:id",
            get(users::get).patch(users::update).delete(users::delete),
        )
        // Shop portal resources
        .route("/employees", get(employees::list).post(employees::create))
        .route(
            "/employees/:id",
            put(employees::update).delete(employees::delete),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/:id", get(orders::get))
        .route("/orders/:id/status", patch(orders::update_status))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/:id",
            put(categories::update).delete(categories::delete),
        )
        .route("/stock", get(stock::list))
        .route("/stock/adjustments", post(stock::adjust))
        .route("/suppliers", get(suppliers::list).post(suppliers::create))
        .route(
            "/suppliers/:id",
            put(suppliers::update).delete(suppliers::delete),
        )
        .route("/cashflow", get(cashflow::summary))
        // Files and shop selection
        .route("/files", post(files::upload))
        .route("/files/:id", delete(files::delete))
        .route(
            "/shop/selected",
            get(shop::get_selected).put(shop::put_selected),
        )
        .route("/layout/sidebar", post(pages::set_sidebar))
}
