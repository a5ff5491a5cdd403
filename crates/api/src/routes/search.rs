use axum::routing::get;
use axum::Router;

use crate::handlers::search;
use crate::state::AppState;

/// Search routes, mounted at `/search`.
///
/// ```text
/// GET    /                     search
/// GET    /requests             search_requests
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search::search))
        .route("/requests", get(search::search_requests))
}
