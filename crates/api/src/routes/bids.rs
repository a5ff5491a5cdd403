//! Route definitions for bids, mounted at `/bids`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bids;
use crate::state::AppState;

/// ```text
/// GET    /mine                 my_bids
/// POST   /{id}/accept          accept_bid
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(bids::my_bids))
        .route("/{id}/accept", post(bids::accept_bid))
}
