use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Coordinate, SearchQuery, ValidationError};

/// Query string accepted by the local pass-through route
///
/// GET /api/search/stations?latitude=..&longitude=..&itemsPerPage=..&geo_distance=..&distance=..
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationSearchParams {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(rename = "itemsPerPage", default = "default_items_per_page")]
    #[validate(range(min = 1))]
    pub items_per_page: u32,
    #[serde(default = "default_geo_distance")]
    pub geo_distance: bool,
    /// Meters; the route falls back to its configured default
    #[validate(range(min = 0.0))]
    pub distance: Option<f64>,
}

fn default_items_per_page() -> u32 {
    200
}

fn default_geo_distance() -> bool {
    true
}

impl StationSearchParams {
    /// Turn route parameters into the outbound backend request
    ///
    /// `NaN` and infinities slip through the derived range checks, so the
    /// coordinates go through [`Coordinate::new`] and the distance must be
    /// finite.
    pub fn to_backend_params(
        &self,
        default_distance: f64,
    ) -> Result<BackendSearchParams, ValidationError> {
        let (latitude, longitude) = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => (latitude, longitude),
            _ => return Err(ValidationError::MissingCoordinates),
        };
        let center = Coordinate::new(latitude, longitude)?;

        let distance = self.distance.unwrap_or(default_distance);
        if !distance.is_finite() {
            return Err(ValidationError::DegenerateRadius(distance));
        }

        Ok(BackendSearchParams {
            latitude: center.latitude(),
            longitude: center.longitude(),
            items_per_page: self.items_per_page,
            geo_distance: self.geo_distance,
            distance: distance.round() as u64,
        })
    }
}

/// Wire form of a station search, serialized into the backend query string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSearchParams {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "itemsPerPage")]
    pub items_per_page: u32,
    pub geo_distance: bool,
    /// Whole meters
    pub distance: u64,
}

impl From<&SearchQuery> for BackendSearchParams {
    fn from(query: &SearchQuery) -> Self {
        Self {
            latitude: query.center.latitude(),
            longitude: query.center.longitude(),
            items_per_page: query.max_results,
            geo_distance: query.distance_filter_enabled,
            // a validated radius is positive, never send it as 0
            distance: (query.radius_meters.round() as u64).max(1),
        }
    }
}
