use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Session;

/// Sessions live for exactly seven days from issue.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Signed session payload. The whole session record rides inside the token;
/// `iat`/`exp` are embedded at signing time and enforced on verify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub session: Session,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(session: Session) -> Self {
        let now = Utc::now();
        Self {
            session,
            iat: now.timestamp(),
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature does not match the session secret")]
    InvalidSignature,
    #[error("session token has expired")]
    Expired,
    #[error("malformed session token: {0}")]
    Malformed(String),
    #[error("session secret is empty")]
    InvalidSecret,
}

/// Sign a session record into its compact cookie form.
pub fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| TokenError::Malformed(e.to_string()))
}

/// Verify a cookie value against the app secret. Expiry is checked with no
/// leeway so a seven-day-old session is rejected at the boundary.
pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, SessionUser};

    const SECRET: &str = "test-secret";

    fn session() -> Session {
        Session {
            user: SessionUser {
                id: "u-42".into(),
                name: "Kofi".into(),
                email: "kofi@example.com".into(),
                role: Role::Admin,
                image: None,
                default_shop_id: None,
                shops: vec![],
            },
            access_token: "access".into(),
            refresh_token: "refresh".into(),
        }
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let token = sign(&Claims::new(session()), SECRET).unwrap();
        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.session, session());
        assert_eq!(
            claims.exp - claims.iat,
            Duration::days(SESSION_TTL_DAYS).num_seconds()
        );
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = sign(&Claims::new(session()), SECRET).unwrap();
        match verify(&token, "other-secret") {
            Err(TokenError::InvalidSignature) => {}
            other => panic!("expected InvalidSignature, got {:?}", other),
        }
    }

    #[test]
    fn verify_rejects_expired_token() {
        let now = Utc::now();
        let claims = Claims {
            session: session(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = sign(&claims, SECRET).unwrap();
        match verify(&token, SECRET) {
            Err(TokenError::Expired) => {}
            other => panic!("expected Expired, got {:?}", other),
        }
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(matches!(
            verify("not-a-token", SECRET),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            sign(&Claims::new(session()), ""),
            Err(TokenError::InvalidSecret)
        ));
    }
}
