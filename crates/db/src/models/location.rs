//! Location row model and DTO.

use huduma_core::geo::GeoPoint;
use huduma_core::types::{Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `locations` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Location {
    pub location_id: Uuid,
    pub user_id: UserId,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: String,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Location {
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}

/// Insert DTO for a new location.
#[derive(Debug, Clone)]
pub struct CreateLocation {
    pub location_id: Uuid,
    pub user_id: UserId,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: String,
    /// Make this the user's default. A user's first location is always default.
    pub make_default: bool,
}

/// Outcome of removing a location.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRemoval {
    /// Deleted. When it was the default, the user's oldest remaining
    /// location is promoted and returned here.
    Removed { promoted: Option<Location> },
    /// The user has no such location.
    Missing,
    /// A request still refers to it.
    InUse,
}
