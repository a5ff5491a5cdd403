//! Request (booking) row models and DTOs.

use huduma_core::geo::GeoPoint;
use huduma_core::lifecycle::RequestStatus;
use huduma_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::location::Location;

/// A row from the `bookings` table.
///
/// The same row represents the client's request while bidding and the
/// booking once a provider is assigned.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Request {
    pub booking_id: Uuid,
    pub client_id: UserId,
    pub provider_id: Option<Uuid>,
    pub category_id: Option<DbId>,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub note: Option<String>,
    pub status: String,
    pub is_urgent: bool,
    pub start_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a new request. Always starts in `bidding`.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub booking_id: Uuid,
    pub client_id: UserId,
    pub category_id: Option<DbId>,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub note: Option<String>,
    pub is_urgent: bool,
    pub start_at: Option<Timestamp>,
    /// Photo URLs, stored in this order.
    pub photos: Vec<String>,
}

/// A freshly created request together with its photos.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRequest {
    #[serde(flatten)]
    pub request: Request,
    pub photos: Vec<String>,
}

/// Full view of one request: row, category, location, photos and bid count.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: Request,
    pub category_name: Option<String>,
    pub location: Option<Location>,
    pub bids_count: i64,
    pub photos: Vec<String>,
}

/// Filter for "my requests" listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestFilter {
    pub client_id: Option<UserId>,
    pub status: Option<RequestStatus>,
}

/// Row returned by [`RequestRepo::filter`](crate::repositories::RequestRepo::filter).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestSummary {
    pub booking_id: Uuid,
    pub title: String,
    pub status: String,
    pub is_urgent: bool,
    pub start_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub provider_id: Option<Uuid>,
    pub provider_name: Option<String>,
    pub provider_photo: Option<String>,
    pub bids_count: i64,
}

/// An open (`bidding`) request as shown in the discovery feed and search.
///
/// Coordinates are carried for distance computation but not serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OpenRequest {
    pub booking_id: Uuid,
    pub title: String,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub is_urgent: bool,
    pub start_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub address: Option<String>,
    #[serde(skip)]
    pub latitude: Option<f64>,
    #[serde(skip)]
    pub longitude: Option<f64>,
}

impl OpenRequest {
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}

/// A category that currently has open requests.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RequestCategory {
    pub id: DbId,
    pub name: String,
}
