//! Request-time route guard.
//!
//! Runs before every page-path handler: resolves the caller's role from the
//! session cookie and either lets the request through or redirects. Denials
//! are always redirects, never errors; an unmatched path is just "not
//! permitted".

pub mod permissions;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::config::AppKind;
use crate::session::Role;
use crate::state::AppState;

/// Paths that only make sense for a logged-out visitor.
const AUTH_PATHS: &[&str] = &["/login", "/register", "/forgot-password", "/reset-password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Pure guard decision for one request.
pub fn evaluate(app: AppKind, role: Option<Role>, path: &str) -> RouteDecision {
    // The landing page is reachable regardless of session state.
    if path == "/" {
        return RouteDecision::Allow;
    }

    let auth_only = AUTH_PATHS.contains(&path);
    match (auth_only, role) {
        // Logged-in users do not revisit login/register.
        (true, Some(_)) => RouteDecision::Redirect(app.landing_path()),
        (true, None) => RouteDecision::Allow,
        (false, None) => RouteDecision::Redirect(app.login_path()),
        (false, Some(role)) => {
            if permissions::is_permitted(app, role, path) {
                RouteDecision::Allow
            } else {
                RouteDecision::Redirect(app.landing_path())
            }
        }
    }
}

/// Axum middleware over the page namespace. Action endpoints under `/api/`,
/// the federated-login callback under `/auth/` and the liveness probe report
/// their own status codes instead of redirecting, so they bypass the guard.
pub async fn route_guard(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if path == "/health" || path.starts_with("/api/") || path.starts_with("/auth/") {
        return next.run(request).await;
    }

    let (jar, session) = state.sessions.get(jar);
    let role = session.map(|s| s.user.role);

    match evaluate(state.config.app, role, &path) {
        RouteDecision::Allow => (jar, next.run(request).await).into_response(),
        RouteDecision::Redirect(to) => {
            tracing::debug!(%path, to, "route guard redirect");
            (jar, Redirect::to(to)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_page_always_allowed() {
        assert_eq!(evaluate(AppKind::Shop, None, "/"), RouteDecision::Allow);
        assert_eq!(
            evaluate(AppKind::Admin, Some(Role::Admin), "/"),
            RouteDecision::Allow
        );
    }

    #[test]
    fn logged_in_user_bounced_off_login() {
        assert_eq!(
            evaluate(AppKind::Shop, Some(Role::ShopStaff), "/login"),
            RouteDecision::Redirect("/dashboard")
        );
        assert_eq!(
            evaluate(AppKind::Customer, Some(Role::Customer), "/register"),
            RouteDecision::Redirect("/")
        );
    }

    #[test]
    fn anonymous_user_may_visit_auth_paths() {
        assert_eq!(evaluate(AppKind::Admin, None, "/login"), RouteDecision::Allow);
        assert_eq!(
            evaluate(AppKind::Customer, None, "/forgot-password"),
            RouteDecision::Allow
        );
    }

    #[test]
    fn anonymous_user_redirected_to_login_elsewhere() {
        assert_eq!(
            evaluate(AppKind::Shop, None, "/dashboard"),
            RouteDecision::Redirect("/login")
        );
    }

    #[test]
    fn unpermitted_role_redirected_to_landing() {
        assert_eq!(
            evaluate(AppKind::Shop, Some(Role::ShopStaff), "/employees"),
            RouteDecision::Redirect("/dashboard")
        );
        assert_eq!(
            evaluate(AppKind::Shop, Some(Role::ShopOwner), "/employees"),
            RouteDecision::Allow
        );
    }
}
