//! Secondary cookies that live alongside the session: the selected-shop
//! reference (shop portal) and the client-readable sidebar layout flag.
//!
//! The selected shop is deliberately outside the signed payload, so it can be
//! cleared or forged independently. The backend re-validates shop membership
//! on every request; this is an accepted trust boundary.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::auth::SESSION_TTL_DAYS;

use super::Session;

pub const SELECTED_SHOP_COOKIE: &str = "selected-shop";
pub const SIDEBAR_STATE_COOKIE: &str = "sidebar_state";

fn shop_cookie(shop_id: String) -> Cookie<'static> {
    Cookie::build((SELECTED_SHOP_COOKIE, shop_id))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::days(SESSION_TTL_DAYS))
        .build()
}

/// Resolve the selected shop for this request. Falls back to the session's
/// default shop, then the first membership, persisting the fallback to the
/// cookie so subsequent requests see a stable choice.
pub fn selected_shop_id(jar: CookieJar, session: &Session) -> (CookieJar, Option<String>) {
    if let Some(cookie) = jar.get(SELECTED_SHOP_COOKIE) {
        let id = cookie.value().to_string();
        if !id.is_empty() {
            return (jar, Some(id));
        }
    }

    let fallback = session
        .user
        .default_shop_id
        .clone()
        .or_else(|| session.user.shops.first().map(|m| m.shop_id.clone()));

    match fallback {
        Some(id) => {
            let jar = jar.add(shop_cookie(id.clone()));
            (jar, Some(id))
        }
        None => (jar, None),
    }
}

/// Persist an explicit shop choice.
pub fn select_shop(jar: CookieJar, shop_id: &str) -> CookieJar {
    jar.add(shop_cookie(shop_id.to_string()))
}

pub fn clear_selected_shop(jar: CookieJar) -> CookieJar {
    jar.remove(
        Cookie::build((SELECTED_SHOP_COOKIE, ""))
            .path("/")
            .max_age(Duration::ZERO)
            .build(),
    )
}

/// Layout cookie read by the browser on first paint. Not HTTP-only on
/// purpose; it carries no security-relevant state.
pub fn sidebar_state(jar: CookieJar, open: bool) -> CookieJar {
    jar.add(
        Cookie::build((SIDEBAR_STATE_COOKIE, if open { "true" } else { "false" }))
            .same_site(SameSite::Lax)
            .path("/")
            .build(),
    )
}
