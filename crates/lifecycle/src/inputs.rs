//! Caller-facing input shapes.
//!
//! Ids and timestamps arrive as strings exactly as the caller sent them and
//! are parsed by the service before any transaction is opened.

use huduma_core::types::DbId;
use serde::Deserialize;

/// Body of a create-request call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRequest {
    pub title: String,
    pub note: Option<String>,
    pub category_id: Option<DbId>,
    /// One of the client's own locations.
    pub location_id: Option<String>,
    #[serde(default)]
    pub is_urgent: bool,
    /// RFC 3339.
    pub start_at: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Body of a submit-bid call.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBid {
    /// Minor currency units.
    pub amount: i64,
}

/// Body of an add-location call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLocation {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: String,
    #[serde(default)]
    pub make_default: bool,
}

/// "My requests" filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub client_id: Option<String>,
    pub status: Option<String>,
}

/// Discovery feed filter. Coordinates default to the requester's default
/// location when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryFilter {
    pub category_id: Option<DbId>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_distance_km: Option<f64>,
}

/// Free-text search over requests and providers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category_id: Option<DbId>,
    pub industry_id: Option<DbId>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_distance_km: Option<f64>,
}
