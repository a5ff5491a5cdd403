use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::locations;
use crate::state::AppState;

/// Location routes, mounted at `/locations`.
///
/// ```text
/// GET    /                     list_locations
/// POST   /                     add_location
/// DELETE /{id}                 remove_location
/// PUT    /{id}/default         set_default_location
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(locations::list_locations).post(locations::add_location),
        )
        .route("/{id}", delete(locations::remove_location))
        .route("/{id}/default", put(locations::set_default_location))
}
