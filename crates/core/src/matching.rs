//! Distance annotation and post-filtering for discovery and search.
//!
//! The store has no geospatial index, so distance-bounded queries fetch the
//! candidate rows first and filter them here. A distance is only computed
//! when both the requester and the candidate have known coordinates; a
//! missing distance never excludes a row.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::geo::{format_distance_km, GeoPoint};
use crate::types::DbId;

/// A row annotated with its distance from the requester, when computable.
#[derive(Debug, Clone, Serialize)]
pub struct Measured<T> {
    #[serde(flatten)]
    pub item: T,
    pub distance_km: Option<f64>,
    /// `distance_km` rendered for display, e.g. `"2.6"`.
    pub distance: Option<String>,
}

impl<T> Measured<T> {
    pub fn new(item: T, distance_km: Option<f64>) -> Self {
        Self {
            item,
            distance_km,
            distance: distance_km.map(format_distance_km),
        }
    }
}

/// Requester origin plus an optional radius cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceFilter {
    pub origin: Option<GeoPoint>,
    pub max_distance_km: Option<f64>,
}

impl DistanceFilter {
    pub fn new(origin: Option<GeoPoint>, max_distance_km: Option<f64>) -> Self {
        Self {
            origin,
            max_distance_km,
        }
    }

    /// Distance from the origin to `target`, if both are known.
    pub fn measure(&self, target: Option<GeoPoint>) -> Option<f64> {
        match (self.origin, target) {
            (Some(origin), Some(target)) => Some(origin.distance_km(&target)),
            _ => None,
        }
    }

    /// Whether a measured distance survives the cutoff.
    ///
    /// Unknown distances are always admitted.
    pub fn admits(&self, distance_km: Option<f64>) -> bool {
        match (self.max_distance_km, distance_km) {
            (Some(max), Some(d)) => d <= max,
            _ => true,
        }
    }

    /// Annotate every item with its distance and drop those beyond the cutoff.
    ///
    /// Input order is preserved.
    pub fn apply<T, F>(&self, items: Vec<T>, locate: F) -> Vec<Measured<T>>
    where
        F: Fn(&T) -> Option<GeoPoint>,
    {
        items
            .into_iter()
            .filter_map(|item| {
                let distance_km = self.measure(locate(&item));
                self.admits(distance_km)
                    .then(|| Measured::new(item, distance_km))
            })
            .collect()
    }
}

/// Validate a user-supplied radius. `None` means "no cutoff".
pub fn validate_max_distance(max_distance_km: Option<f64>) -> Result<(), CoreError> {
    match max_distance_km {
        Some(d) if !d.is_finite() || d < 0.0 => Err(CoreError::Validation(format!(
            "max_distance_km must be a non-negative number, got {d}"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Category aggregation
// ---------------------------------------------------------------------------

/// Number of matching open requests in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub count: i64,
}

/// Group items by category and count them.
///
/// Ordered by count descending, then category name ascending (uncategorised
/// last), so identical inputs always aggregate to the same sequence.
pub fn aggregate_by_category<T, F>(items: &[T], category_of: F) -> Vec<CategoryCount>
where
    F: Fn(&T) -> (Option<DbId>, Option<String>),
{
    let mut counts: HashMap<Option<DbId>, CategoryCount> = HashMap::new();
    for item in items {
        let (category_id, category_name) = category_of(item);
        counts
            .entry(category_id)
            .or_insert_with(|| CategoryCount {
                category_id,
                category_name,
                count: 0,
            })
            .count += 1;
    }

    let mut out: Vec<CategoryCount> = counts.into_values().collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| match (&a.category_name, &b.category_name) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    out
}
