//! Provider row models used by bidding and provider search.

use huduma_core::geo::GeoPoint;
use huduma_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `providers` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Provider {
    pub provider_id: Uuid,
    pub user_id: UserId,
    pub category_id: Option<DbId>,
    pub industry_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Criteria for provider search. All fields are optional and AND-ed.
#[derive(Debug, Clone, Default)]
pub struct ProviderSearch {
    /// An `ILIKE` pattern matched against name, category and industry.
    pub pattern: Option<String>,
    pub category_id: Option<DbId>,
    pub industry_id: Option<DbId>,
}

/// A provider search hit, positioned at the provider's default location.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProviderMatch {
    pub provider_id: Uuid,
    pub user_id: UserId,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub industry_id: Option<DbId>,
    pub industry_name: Option<String>,
    #[serde(skip)]
    pub latitude: Option<f64>,
    #[serde(skip)]
    pub longitude: Option<f64>,
}

impl ProviderMatch {
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}
