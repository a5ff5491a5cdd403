//! The lifecycle facade.

use std::fmt::Display;

use chrono::Utc;
use huduma_core::error::CoreError;
use huduma_core::geo::{validate_coordinates, GeoPoint};
use huduma_core::lifecycle::{self, LifecycleEvent, RequestStatus};
use huduma_core::matching::{
    aggregate_by_category, validate_max_distance, CategoryCount, DistanceFilter, Measured,
};
use huduma_core::search::{build_like_pattern, normalize_query};
use huduma_core::types::DbId;
use huduma_core::validation::{
    parse_timestamp, parse_uuid, resolve_start_at, validate_bid_amount, validate_note,
    validate_photo_urls, validate_title,
};
use huduma_db::models::bid::{AcceptedBid, Bid, BidWithProvider, CreateBid};
use huduma_db::models::location::{CreateLocation, Location, LocationRemoval};
use huduma_db::models::provider::{ProviderMatch, ProviderSearch};
use huduma_db::models::request::{
    CreateRequest, CreatedRequest, OpenRequest, Request, RequestCategory, RequestDetail,
    RequestFilter, RequestSummary,
};
use huduma_db::models::transition::Transition;
use huduma_db::repositories::{BidRepo, LocationRepo, ProviderRepo, RequestRepo};
use huduma_db::DbPool;
use serde::Serialize;
use uuid::Uuid;

use crate::config::LifecycleConfig;
use crate::error::LifecycleResult;
use crate::inputs::{DiscoveryFilter, FilterParams, NewBid, NewLocation, NewRequest, SearchQuery};

/// Combined search response: matching providers plus request categories.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub providers: Vec<Measured<ProviderMatch>>,
    pub categories: Vec<CategoryCount>,
}

/// Entry point for every lifecycle operation.
///
/// Cheap to clone; holds the pool and configuration only. Mutations each
/// run in exactly one store transaction. Reads go straight to the pool.
#[derive(Debug, Clone)]
pub struct LifecycleService {
    pool: DbPool,
    config: LifecycleConfig,
}

impl LifecycleService {
    pub fn new(pool: DbPool, config: LifecycleConfig) -> Self {
        Self { pool, config }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Open a new request for bids, attaching its photos in order.
    ///
    /// Urgent requests without a start time start after the configured
    /// window.
    pub async fn create_request(
        &self,
        actor: &str,
        input: NewRequest,
    ) -> LifecycleResult<CreatedRequest> {
        let title = validate_title(&input.title)?.to_string();
        validate_note(input.note.as_deref())?;
        let start_at = parse_timestamp("start_at", input.start_at.as_deref())?;
        let location_id = input
            .location_id
            .as_deref()
            .map(|v| parse_uuid("location_id", v))
            .transpose()?;
        validate_photo_urls(&input.photos)?;

        if let Some(location_id) = location_id {
            let owned = LocationRepo::find_by_id(&self.pool, location_id)
                .await?
                .is_some_and(|l| l.user_id == actor);
            if !owned {
                return Err(CoreError::not_found("Location", location_id).into());
            }
        }

        let create = CreateRequest {
            booking_id: Uuid::new_v4(),
            client_id: actor.to_string(),
            category_id: input.category_id,
            location_id,
            title,
            note: input
                .note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            is_urgent: input.is_urgent,
            start_at: resolve_start_at(
                input.is_urgent,
                start_at,
                Utc::now(),
                self.config.urgent_start_window_hours,
            )?,
            photos: input.photos.iter().map(|p| p.trim().to_string()).collect(),
        };

        Ok(RequestRepo::create(&self.pool, &create).await?)
    }

    /// Place the actor's bid on an open request.
    ///
    /// The actor must be a registered provider and must not own the request.
    pub async fn submit_bid(
        &self,
        actor: &str,
        request_id: &str,
        input: NewBid,
    ) -> LifecycleResult<Bid> {
        let booking_id = parse_uuid("request_id", request_id)?;
        validate_bid_amount(input.amount)?;

        let provider = ProviderRepo::find_by_user_id(&self.pool, actor)
            .await?
            .ok_or_else(|| CoreError::Forbidden("Only registered providers can place bids".into()))?;

        let create = CreateBid {
            booking_id,
            provider_id: provider.provider_id,
            amount: input.amount,
        };
        let outcome = BidRepo::create(&self.pool, &create, actor).await?;
        settle(outcome, LifecycleEvent::SubmitBid, booking_id)
    }

    /// Accept a bid. Exactly one bid per request can ever win.
    pub async fn accept_bid(&self, actor: &str, bid_id: DbId) -> LifecycleResult<AcceptedBid> {
        let outcome = BidRepo::accept(&self.pool, bid_id, actor).await?;
        settle(outcome, LifecycleEvent::AcceptBid, bid_id)
    }

    /// Mark a pending booking as done.
    pub async fn complete_booking(&self, actor: &str, request_id: &str) -> LifecycleResult<Request> {
        let booking_id = parse_uuid("request_id", request_id)?;
        let outcome = RequestRepo::complete(&self.pool, booking_id, actor).await?;
        settle(outcome, LifecycleEvent::Complete, booking_id)
    }

    /// Cancel an open request or a pending booking.
    pub async fn cancel_booking(&self, actor: &str, request_id: &str) -> LifecycleResult<Request> {
        let booking_id = parse_uuid("request_id", request_id)?;
        let outcome = RequestRepo::cancel(&self.pool, booking_id, actor).await?;
        settle(outcome, LifecycleEvent::Cancel, booking_id)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Requests by client and/or status, newest first.
    pub async fn filter_requests(&self, params: FilterParams) -> LifecycleResult<Vec<RequestSummary>> {
        let status = non_blank(params.status.as_deref())
            .map(str::parse::<RequestStatus>)
            .transpose()?;
        let filter = RequestFilter {
            client_id: non_blank(params.client_id.as_deref()).map(str::to_string),
            status,
        };
        Ok(RequestRepo::filter(&self.pool, &filter).await?)
    }

    /// Discovery feed of open requests with distances from the requester.
    ///
    /// Without explicit coordinates the requester's default location is
    /// used; with neither, no distances are computed and nothing is dropped.
    pub async fn all_requests(
        &self,
        actor: &str,
        filter: DiscoveryFilter,
    ) -> LifecycleResult<Vec<Measured<OpenRequest>>> {
        validate_max_distance(filter.max_distance_km)?;
        let origin = match origin(filter.latitude, filter.longitude)? {
            Some(point) => Some(point),
            None => LocationRepo::find_default(&self.pool, actor)
                .await?
                .and_then(|l| l.position()),
        };

        let rows = RequestRepo::list_open(&self.pool, filter.category_id).await?;
        let measured =
            DistanceFilter::new(origin, filter.max_distance_km).apply(rows, OpenRequest::position);

        tracing::debug!(
            actor = %actor,
            has_origin = origin.is_some(),
            results = measured.len(),
            "Discovery feed served",
        );
        Ok(measured)
    }

    /// Open requests matching the query, counted per category.
    ///
    /// A blank query counts every open request.
    pub async fn instant_search_requests(
        &self,
        query: &SearchQuery,
    ) -> LifecycleResult<Vec<CategoryCount>> {
        validate_max_distance(query.max_distance_km)?;
        let origin = origin(query.latitude, query.longitude)?;

        let rows = match normalize_query(query.q.as_deref().unwrap_or_default())? {
            Some(term) => {
                RequestRepo::search_open(&self.pool, &build_like_pattern(term), query.category_id)
                    .await?
            },
            None => RequestRepo::list_open(&self.pool, query.category_id).await?,
        };
        let measured =
            DistanceFilter::new(origin, query.max_distance_km).apply(rows, OpenRequest::position);

        Ok(aggregate_by_category(&measured, |m| {
            (m.item.category_id, m.item.category_name.clone())
        }))
    }

    /// Providers matching the query by name, category or industry.
    pub async fn search_providers(
        &self,
        query: &SearchQuery,
    ) -> LifecycleResult<Vec<Measured<ProviderMatch>>> {
        validate_max_distance(query.max_distance_km)?;
        let origin = origin(query.latitude, query.longitude)?;

        let criteria = ProviderSearch {
            pattern: normalize_query(query.q.as_deref().unwrap_or_default())?
                .map(build_like_pattern),
            category_id: query.category_id,
            industry_id: query.industry_id,
        };
        let rows = ProviderRepo::search(&self.pool, &criteria).await?;

        Ok(DistanceFilter::new(origin, query.max_distance_km).apply(rows, ProviderMatch::position))
    }

    /// Providers and request categories for one query.
    pub async fn search(&self, query: &SearchQuery) -> LifecycleResult<SearchResults> {
        let providers = self.search_providers(query).await?;
        let categories = self.instant_search_requests(query).await?;
        Ok(SearchResults {
            providers,
            categories,
        })
    }

    /// One request with its photos, location and bid count.
    pub async fn find_request(&self, request_id: &str) -> LifecycleResult<RequestDetail> {
        let booking_id = parse_uuid("request_id", request_id)?;
        RequestRepo::find_detail(&self.pool, booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Request", booking_id).into())
    }

    /// Bids on a request, oldest first.
    pub async fn list_bids_for_request(
        &self,
        request_id: &str,
    ) -> LifecycleResult<Vec<BidWithProvider>> {
        let booking_id = parse_uuid("request_id", request_id)?;
        if RequestRepo::find_by_id(&self.pool, booking_id).await?.is_none() {
            return Err(CoreError::not_found("Request", booking_id).into());
        }
        Ok(BidRepo::list_by_request(&self.pool, booking_id).await?)
    }

    /// Bids the actor placed as a provider. Empty for non-providers.
    pub async fn list_my_bids(&self, actor: &str) -> LifecycleResult<Vec<Bid>> {
        match ProviderRepo::find_by_user_id(&self.pool, actor).await? {
            Some(provider) => Ok(BidRepo::list_by_provider(&self.pool, provider.provider_id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Categories that currently have open requests.
    pub async fn list_request_categories(&self) -> LifecycleResult<Vec<RequestCategory>> {
        Ok(RequestRepo::list_open_categories(&self.pool).await?)
    }

    // -----------------------------------------------------------------------
    // Locations
    // -----------------------------------------------------------------------

    /// Save a location for the actor. Their first location becomes the default.
    pub async fn add_location(&self, actor: &str, input: NewLocation) -> LifecycleResult<Location> {
        let address = input.address.trim();
        if address.is_empty() {
            return Err(CoreError::Validation("address: must not be empty".into()).into());
        }
        let position = origin(input.latitude, input.longitude)?;

        let create = CreateLocation {
            location_id: Uuid::new_v4(),
            user_id: actor.to_string(),
            name: input
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
            address: address.to_string(),
            make_default: input.make_default,
        };
        let outcome = LocationRepo::create(&self.pool, &create).await?;
        match outcome {
            Transition::Applied(location) => Ok(location),
            _ => Err(CoreError::not_found("User", actor).into()),
        }
    }

    /// The actor's locations, default first.
    pub async fn list_locations(&self, actor: &str) -> LifecycleResult<Vec<Location>> {
        Ok(LocationRepo::list_by_user(&self.pool, actor).await?)
    }

    /// Switch the actor's default location.
    pub async fn set_default_location(
        &self,
        actor: &str,
        location_id: &str,
    ) -> LifecycleResult<Location> {
        let location_id = parse_uuid("location_id", location_id)?;
        LocationRepo::set_default(&self.pool, actor, location_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Location", location_id).into())
    }

    /// Delete one of the actor's locations. Locations a request points at
    /// cannot be removed.
    pub async fn remove_location(&self, actor: &str, location_id: &str) -> LifecycleResult<()> {
        let location_id = parse_uuid("location_id", location_id)?;
        match LocationRepo::remove(&self.pool, actor, location_id).await? {
            LocationRemoval::Removed { .. } => Ok(()),
            LocationRemoval::Missing => Err(CoreError::not_found("Location", location_id).into()),
            LocationRemoval::InUse => Err(CoreError::Conflict(
                "Location is used by a request and cannot be removed".into(),
            )
            .into()),
        }
    }
}

/// Translate a guarded write's outcome into the caller-facing result.
fn settle<T>(outcome: Transition<T>, event: LifecycleEvent, id: impl Display) -> LifecycleResult<T> {
    let err = match outcome {
        Transition::Applied(value) => return Ok(value),
        Transition::Missing(entity) => CoreError::not_found(entity, id),
        Transition::Forbidden => lifecycle::forbidden(event),
        Transition::Stale(current) => lifecycle::stale_state(event, current),
        Transition::Duplicate => lifecycle::duplicate(event),
    };
    tracing::debug!(?event, error = %err, "Lifecycle write refused");
    Err(err.into())
}

/// Requester position from optional query coordinates. Both or neither.
fn origin(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<GeoPoint>, CoreError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => {
            validate_coordinates(lat, lon)?;
            Ok(Some(GeoPoint::new(lat, lon)))
        }
        (None, None) => Ok(None),
        _ => Err(CoreError::Validation(
            "latitude and longitude must be supplied together".into(),
        )),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
