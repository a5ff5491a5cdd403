//! Great-circle distance and coordinate validation.
//!
//! Distances are computed with the haversine formula on a spherical Earth.
//! There is no caching: callers compute one distance per comparison.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude bounds in degrees.
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bounds in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point from two nullable columns. Both halves must be present.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Self::new(lat, lon)),
            _ => None,
        }
    }

    /// Distance to another point in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance in kilometres between two points given in degrees.
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
/// d = 2 · R · asin(√a)
/// ```
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = haversin(d_phi) + phi1.cos() * phi2.cos() * haversin(d_lambda);

    // Rounding can push `a` a hair above 1.0 for antipodal points.
    2.0 * EARTH_RADIUS_KM * a.clamp(0.0, 1.0).sqrt().asin()
}

fn haversin(theta: f64) -> f64 {
    let s = (theta / 2.0).sin();
    s * s
}

/// Render a distance with one decimal place, e.g. `"2.0"`.
pub fn format_distance_km(distance: f64) -> String {
    format!("{distance:.1}")
}

/// Validate that a coordinate pair is finite and within range.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), CoreError> {
    if !latitude.is_finite() || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        return Err(CoreError::Validation(format!(
            "latitude must be between {MIN_LATITUDE} and {MAX_LATITUDE}, got {latitude}"
        )));
    }
    if !longitude.is_finite() || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        return Err(CoreError::Validation(format!(
            "longitude must be between {MIN_LONGITUDE} and {MAX_LONGITUDE}, got {longitude}"
        )));
    }
    Ok(())
}
