//! Route definitions for requests, mounted at `/requests`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{bids, requests};
use crate::state::AppState;

/// ```text
/// POST   /                     create_request
/// GET    /                     list_requests
/// GET    /{id}                 get_request
/// GET    /{id}/bids            list_bids
/// POST   /{id}/bids            submit_bid
/// POST   /{id}/complete        complete_request
/// POST   /{id}/cancel          cancel_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(requests::create_request).get(requests::list_requests),
        )
        .route("/{id}", get(requests::get_request))
        .route("/{id}/bids", get(bids::list_bids).post(bids::submit_bid))
        .route("/{id}/complete", post(requests::complete_request))
        .route("/{id}/cancel", post(requests::cancel_request))
}
