//! Handlers for bidding and bid acceptance.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use huduma_core::validation::parse_id;
use huduma_lifecycle::inputs::NewBid;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::validated::ValidJson;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/requests/{id}/bids
pub async fn list_bids(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let bids = state.lifecycle.list_bids_for_request(&id).await?;
    Ok(Json(DataResponse { data: bids }))
}

/// POST /api/v1/requests/{id}/bids
///
/// Place a bid as the calling provider.
pub async fn submit_bid(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<NewBid>,
) -> AppResult<impl IntoResponse> {
    let bid = state.lifecycle.submit_bid(&auth.user_id, &id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: bid })))
}

/// POST /api/v1/bids/{id}/accept
///
/// Accept a bid on one of the caller's requests. A request that already has
/// an accepted bid answers 409.
pub async fn accept_bid(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(bid_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let bid_id = parse_id("bid_id", &bid_id)?;
    let accepted = state.lifecycle.accept_bid(&auth.user_id, bid_id).await?;
    Ok(Json(DataResponse { data: accepted }))
}

/// GET /api/v1/bids/mine
pub async fn my_bids(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let bids = state.lifecycle.list_my_bids(&auth.user_id).await?;
    Ok(Json(DataResponse { data: bids }))
}
