//! HTTP request handlers.

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::auth::{BasicUser, CurrentUser};
use crate::device::{Device, DeviceList, DeviceListQuery};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub online: bool,
    /// Seconds since startup, rounded to milliseconds.
    pub uptime: f64,
}

/// Server status. Needs no credentials.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let uptime = (state.uptime_secs() * 1000.0).round() / 1000.0;
    Json(StatusResponse {
        online: true,
        uptime,
    })
}

/// Bearer token issued in exchange for Basic credentials.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Exchange Basic credentials for a bearer token.
#[instrument(skip(state, user), fields(principal = %user.0))]
pub async fn authenticate(
    State(state): State<AppState>,
    user: BasicUser,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.auth.issue_token(&user.0)?;
    Ok(Json(TokenResponse { token }))
}

/// List the caller's devices, optionally filtered by query parameters.
pub async fn list_devices(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<DeviceList>> {
    let query = DeviceListQuery::from_params(&params);
    let devices = state.devices.list(user.principal(), &query).await?;
    Ok(Json(DeviceList { devices }))
}

/// Register a new device owned by the caller.
pub async fn create_device(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Bytes,
) -> ApiResult<Json<Device>> {
    let device = state.devices.create(user.principal(), &body).await?;
    Ok(Json(device))
}

/// Get one device.
pub async fn get_device(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Device>> {
    let id = parse_id(&id)?;
    let device = state.devices.get(user.principal(), id).await?;
    Ok(Json(device))
}

/// Replace every client-settable field of a device.
pub async fn replace_device(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Device>> {
    let id = parse_id(&id)?;
    let device = state.devices.replace(user.principal(), id, &body).await?;
    Ok(Json(device))
}

/// Update the name and/or location of a device.
pub async fn patch_device(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Device>> {
    let id = parse_id(&id)?;
    let device = state.devices.patch(user.principal(), id, &body).await?;
    Ok(Json(device))
}

/// Delete a device. Responds with an empty object.
pub async fn delete_device(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;
    state.devices.delete(user.principal(), id).await?;
    Ok(Json(json!({})))
}

/// Download a plain-text report of a device.
pub async fn device_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let report = state.devices.report(user.principal(), id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, report.content_disposition()),
        ],
        report.body,
    ))
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Device ids in paths must be integers; anything else names no device.
fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::NotFound)));
        assert!(matches!(parse_id(""), Err(ApiError::NotFound)));
        assert!(matches!(
            parse_id("99999999999999999999999"),
            Err(ApiError::NotFound)
        ));
    }
}
