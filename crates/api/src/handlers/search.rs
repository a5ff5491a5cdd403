use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use huduma_lifecycle::inputs::SearchQuery;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::validated::ValidQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/search?q=&category_id=&industry_id=&latitude=&longitude=&max_distance_km=
///
/// Providers matching the query plus open-request counts per category.
pub async fn search(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    let results = state.lifecycle.search(&query).await?;
    Ok(Json(DataResponse { data: results }))
}

/// GET /api/v1/search/requests?q=
pub async fn search_requests(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    let categories = state.lifecycle.instant_search_requests(&query).await?;
    Ok(Json(DataResponse { data: categories }))
}
