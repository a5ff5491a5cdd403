//! Handlers for requests and the bookings they become.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use huduma_lifecycle::inputs::{DiscoveryFilter, FilterParams, NewRequest};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::validated::{ValidJson, ValidQuery};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/requests
///
/// Open a new request for bids. Photos are stored in the order given.
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<NewRequest>,
) -> AppResult<impl IntoResponse> {
    let created = state.lifecycle.create_request(&auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/requests?client_id=&status=
///
/// List requests, newest first. Defaults to the caller's own requests.
pub async fn list_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(mut params): ValidQuery<FilterParams>,
) -> AppResult<impl IntoResponse> {
    if params.client_id.is_none() {
        params.client_id = Some(auth.user_id);
    }
    let requests = state.lifecycle.filter_requests(params).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/{id}
pub async fn get_request(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let detail = state.lifecycle.find_request(&id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/requests/{id}/complete
pub async fn complete_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let request = state.lifecycle.complete_booking(&auth.user_id, &id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/cancel
///
/// Allowed to the client, or to the provider once booked.
pub async fn cancel_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let request = state.lifecycle.cancel_booking(&auth.user_id, &id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// GET /api/v1/all-requests?category_id=&latitude=&longitude=&max_distance_km=
///
/// Discovery feed of open requests with distances from the caller.
pub async fn all_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(filter): ValidQuery<DiscoveryFilter>,
) -> AppResult<impl IntoResponse> {
    let feed = state.lifecycle.all_requests(&auth.user_id, filter).await?;
    Ok(Json(DataResponse { data: feed }))
}

/// GET /api/v1/request-categories
pub async fn list_request_categories(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let categories = state.lifecycle.list_request_categories().await?;
    Ok(Json(DataResponse { data: categories }))
}
