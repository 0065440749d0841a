use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use thiserror::Error;
use time::Duration;

use crate::auth::{self, Claims, TokenError, SESSION_TTL_DAYS};

use super::{Session, SessionUserUpdate};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active session")]
    NoSession,
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Cookie-backed session store. Stateless apart from the signing secret:
/// every operation works on the request's own cookie jar, so there is no
/// cross-request shared state to coordinate.
///
/// The jar is threaded functionally; callers must return the jar they get
/// back or the Set-Cookie headers are lost.
#[derive(Clone)]
pub struct SessionStore {
    secret: String,
}

impl SessionStore {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn session_cookie(token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::days(SESSION_TTL_DAYS))
            .build()
    }

    fn removal_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .max_age(Duration::ZERO)
            .build()
    }

    /// Serialize and set the session cookie, overwriting any existing one.
    pub fn create(&self, jar: CookieJar, session: Session) -> Result<CookieJar, SessionError> {
        let token = auth::sign(&Claims::new(session), &self.secret)?;
        Ok(jar.add(Self::session_cookie(token)))
    }

    /// Read the current session. Fail-closed: a cookie that fails
    /// verification (bad signature, expired, garbled) is removed and
    /// reported as logged-out rather than an error.
    pub fn get(&self, jar: CookieJar) -> (CookieJar, Option<Session>) {
        let value = match jar.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return (jar, None),
        };

        match auth::verify(&value, &self.secret) {
            Ok(claims) => (jar, Some(claims.session)),
            Err(err) => {
                tracing::debug!("discarding unverifiable session cookie: {}", err);
                (jar.remove(Self::removal_cookie()), None)
            }
        }
    }

    /// Merge profile fields into the user portion of the current session.
    /// Tokens are untouched. Re-issues the cookie whole; the signed artifact
    /// cannot be partially mutated.
    pub fn update(
        &self,
        jar: CookieJar,
        fields: SessionUserUpdate,
    ) -> Result<CookieJar, SessionError> {
        let (jar, session) = self.get(jar);
        let mut session = session.ok_or(SessionError::NoSession)?;
        session.user.apply(fields);
        let jar = jar.remove(Self::removal_cookie());
        self.create(jar, session)
    }

    /// Replace both tokens, preserving the user portion. Used after the
    /// backend client performed a refresh exchange mid-request.
    pub fn update_tokens(
        &self,
        jar: CookieJar,
        access_token: String,
        refresh_token: String,
    ) -> Result<CookieJar, SessionError> {
        let (jar, session) = self.get(jar);
        let mut session = session.ok_or(SessionError::NoSession)?;
        session.access_token = access_token;
        session.refresh_token = refresh_token;
        let jar = jar.remove(Self::removal_cookie());
        self.create(jar, session)
    }

    /// Remove the session cookie. Safe to call when none exists.
    pub fn delete(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Self::removal_cookie())
    }
}
