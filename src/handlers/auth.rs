//! Session lifecycle actions: login, logout, federated callback, password
//! reset and profile updates. Each one validates its form, forwards to the
//! backend and re-issues the session cookie as needed.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::RequestSpec;
use crate::error::{ApiError, GatewayError};
use crate::response::ApiResponse;
use crate::session::{shop, Session, SessionUser, SessionUserUpdate};
use crate::state::AppState;

use super::{forward, FieldErrors};

const BAD_CREDENTIALS: &str = "Invalid email or password";

fn auth_path(state: &AppState, suffix: &str) -> String {
    format!("{}/{}", state.config.paths.auth.trim_end_matches('/'), suffix)
}

/// Token grant returned by login and the federated callback.
#[derive(Debug, Deserialize)]
struct LoginGrant {
    user: SessionUser,
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_email("email", &self.email);
        errors.require("password", &self.password);
        errors.into_result()
    }
}

/// POST /api/auth/login
///
/// The role gate runs after the backend accepts the credential: a valid
/// account that this portal does not serve gets the same "invalid email or
/// password" answer as a wrong password, so the response does not reveal
/// where the account lives.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    form.validate()?;

    let spec = RequestSpec::post(
        auth_path(&state, "login"),
        json!({ "email": form.email, "password": form.password }),
    );
    let response = state.backend.send(&spec, None).await?;
    if !response.is_success() {
        return Err(ApiError::unauthorized(
            response.message().unwrap_or(BAD_CREDENTIALS).to_string(),
        ));
    }

    let grant: LoginGrant = serde_json::from_value(response.data()).map_err(|e| {
        tracing::error!("unexpected login payload from backend: {}", e);
        ApiError::bad_gateway("Unexpected response from the authentication service")
    })?;

    if !state.config.app.allowed_roles().contains(&grant.user.role) {
        tracing::info!(role = grant.user.role.as_str(), "login refused by portal role gate");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let user_view = serde_json::to_value(&grant.user)
        .map_err(|_| ApiError::internal("Failed to serialize user"))?;
    let session = Session {
        user: grant.user,
        access_token: grant.access_token,
        refresh_token: grant.refresh_token,
    };
    let jar = state.sessions.create(jar, session)?;

    Ok((jar, ApiResponse::success(json!({ "user": user_view }))))
}

/// POST /api/auth/logout
///
/// Backend logout is best-effort; the cookie is removed either way.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let (jar, session) = state.sessions.get(jar);
    if let Some(session) = &session {
        let spec = RequestSpec::post(auth_path(&state, "logout"), json!({}));
        if let Err(e) = state.backend.send(&spec, Some(session)).await {
            tracing::warn!("backend logout failed, clearing session anyway: {}", e);
        }
    }
    let jar = state.sessions.delete(jar);
    let jar = shop::clear_selected_shop(jar);
    Ok((jar, ApiResponse::success(json!({ "signed_out": true }))))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
}

/// GET /auth/callback
///
/// Federated-login callback: the provider bounces the browser here with a
/// one-time code; the backend swaps it for a grant and we land the user.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect), ApiError> {
    if query.code.trim().is_empty() {
        return Ok((jar, Redirect::to(state.config.app.login_path())));
    }

    let spec = RequestSpec::post(
        auth_path(&state, "oauth/callback"),
        json!({ "code": query.code }),
    );
    let response = state.backend.send(&spec, None).await?;
    if !response.is_success() {
        tracing::info!("federated login rejected by backend");
        return Ok((jar, Redirect::to(state.config.app.login_path())));
    }

    let grant: LoginGrant = serde_json::from_value(response.data()).map_err(|e| {
        tracing::error!("unexpected callback payload from backend: {}", e);
        ApiError::bad_gateway("Unexpected response from the authentication service")
    })?;

    if !state.config.app.allowed_roles().contains(&grant.user.role) {
        return Ok((jar, Redirect::to(state.config.app.login_path())));
    }

    let session = Session {
        user: grant.user,
        access_token: grant.access_token,
        refresh_token: grant.refresh_token,
    };
    let jar = state.sessions.create(jar, session)?;
    Ok((jar, Redirect::to(state.config.app.landing_path())))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let (jar, session) = state.sessions.get(jar);
    let session = session.ok_or_else(|| ApiError::unauthorized("Not signed in"))?;
    let user = serde_json::to_value(&session.user)
        .map_err(|_| ApiError::internal("Failed to serialize user"))?;
    Ok((jar, ApiResponse::success(json!({ "user": user }))))
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub image: Option<String>,
}

impl ProfileForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.require("name", name);
        }
        errors.into_result()
    }
}

/// PATCH /api/auth/profile
///
/// Forwards the change, then merges the same fields into the session cookie
/// so the header avatar/name stay current without a re-login.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<ProfileForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;

    let body = json!({ "name": form.name, "image": form.image });
    let spec = RequestSpec::patch(auth_path(&state, "profile"), body);
    let (jar, data) = forward(&state, jar, spec).await?;

    let jar = state.sessions.update(
        jar,
        SessionUserUpdate {
            name: form.name,
            image: form.image,
            ..Default::default()
        },
    )?;

    Ok((jar, ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<ForgotPasswordForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let mut errors = FieldErrors::new();
    errors.require_email("email", &form.email);
    errors.into_result()?;

    let spec = RequestSpec::post(
        auth_path(&state, "forgot-password"),
        json!({ "email": form.email }),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

impl ResetPasswordForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("token", &self.token);
        if self.password.len() < 8 {
            errors.add("password", "Password must be at least 8 characters");
        }
        if self.password != self.password_confirmation {
            errors.add("password_confirmation", "Passwords do not match");
        }
        errors.into_result()
    }
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<ResetPasswordForm>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    form.validate()?;

    let spec = RequestSpec::post(
        auth_path(&state, "reset-password"),
        json!({ "token": form.token, "password": form.password }),
    );
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}
