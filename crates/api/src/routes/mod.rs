pub mod bids;
pub mod health;
pub mod locations;
pub mod requests;
pub mod search;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires a Bearer token.
///
/// ```text
/// /requests                           create, list mine (POST, GET)
/// /requests/{id}                      detail
/// /requests/{id}/bids                 list, submit (GET, POST)
/// /requests/{id}/complete             complete booking (POST)
/// /requests/{id}/cancel               cancel request/booking (POST)
///
/// /bids/mine                          bids placed by the caller
/// /bids/{id}/accept                   accept bid (POST)
///
/// /all-requests                       discovery feed
/// /request-categories                 categories with open requests
///
/// /search                             providers + request categories
/// /search/requests                    request categories only
///
/// /locations                          list, add (GET, POST)
/// /locations/{id}                     remove (DELETE)
/// /locations/{id}/default             make default (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/requests", requests::router())
        .nest("/bids", bids::router())
        .route("/all-requests", get(handlers::requests::all_requests))
        .route(
            "/request-categories",
            get(handlers::requests::list_request_categories),
        )
        .nest("/search", search::router())
        .nest("/locations", locations::router())
}
