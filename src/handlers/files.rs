//! File upload/delete passthrough. Uploads are buffered whole so the
//! backend client can reissue the request after a token refresh, same as any
//! other forwarded call.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum_extra::extract::CookieJar;
use serde_json::Value;

use crate::client::{RequestSpec, UploadPart};
use crate::error::{ApiError, GatewayError};
use crate::response::ApiResponse;
use crate::state::AppState;

use super::{commit_refreshed, forward};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// POST /api/files
pub async fn upload(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let mut parts: Vec<UploadPart> = Vec::new();
    let mut total = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().unwrap_or("file").to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Malformed upload: {}", e)))?;

        total += bytes.len();
        if total > MAX_UPLOAD_BYTES {
            return Err(ApiError::bad_request("Upload exceeds the 10MB limit").into());
        }

        parts.push(UploadPart {
            name,
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if parts.is_empty() {
        return Err(ApiError::bad_request("No file provided").into());
    }

    let (jar, session) = state.sessions.get(jar);
    let response = match state
        .backend
        .send_multipart(&state.config.paths.files, &parts, session.as_ref())
        .await
    {
        Ok(response) => response,
        Err(e) => return Err(GatewayError::with_jar(jar, e.into())),
    };
    let jar = commit_refreshed(&state.sessions, jar, response.refreshed.clone())?;
    if response.is_success() {
        Ok((jar, ApiResponse::created(response.data())))
    } else {
        Err(GatewayError::with_jar(
            jar,
            ApiError::from_upstream(response.status, response.message()),
        ))
    }
}

/// DELETE /api/files/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, ApiResponse<Value>), GatewayError> {
    let spec = RequestSpec::delete(format!("{}/{}", state.config.paths.files, id));
    let (jar, data) = forward(&state, jar, spec).await?;
    Ok((jar, ApiResponse::success(data)))
}
