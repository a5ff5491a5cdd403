use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use huduma_lifecycle::inputs::NewLocation;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::validated::ValidJson;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/locations
pub async fn list_locations(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let locations = state.lifecycle.list_locations(&auth.user_id).await?;
    Ok(Json(DataResponse { data: locations }))
}

/// POST /api/v1/locations
///
/// The caller's first location becomes their default.
pub async fn add_location(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<NewLocation>,
) -> AppResult<impl IntoResponse> {
    let location = state.lifecycle.add_location(&auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: location })))
}

/// DELETE /api/v1/locations/{id}
///
/// Removing the default promotes the caller's oldest remaining location.
pub async fn remove_location(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.lifecycle.remove_location(&auth.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/locations/{id}/default
pub async fn set_default_location(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let location = state.lifecycle.set_default_location(&auth.user_id, &id).await?;
    tracing::info!(user_id = %auth.user_id, location_id = %location.location_id, "Default location set");
    Ok(Json(DataResponse { data: location }))
}
