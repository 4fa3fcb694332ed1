use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Input rejected before any search is issued.
///
/// These never reach the search state; the offending event is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("search radius {0} is not a positive finite distance")]
    DegenerateRadius(f64),

    #[error("latitude and longitude are required")]
    MissingCoordinates,
}

/// A WGS84 position in decimal degrees.
///
/// Construction goes through [`Coordinate::new`], so every value in the
/// crate is inside the valid latitude/longitude ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

impl Coordinate {
    /// Fallback map center when no position is known
    pub const PARIS: Coordinate = Coordinate {
        latitude: 48.8566,
        longitude: 2.3522,
    };

    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        // NaN fails both range checks
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Visible extent of the map, in degrees, as reported on a settle event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl ViewportBounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self { north, south, east, west }
    }
}

/// A single "stations near here" request.
///
/// Built by the controller for every issued search and handed to the gateway
/// by value; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub center: Coordinate,
    pub radius_meters: f64,
    pub max_results: u32,
    pub distance_filter_enabled: bool,
}

/// Postal address and position of a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street_line_1: String,
    pub street_line_2: Option<String>,
    pub street_line_3: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub location: Coordinate,
}

/// Station snapshot as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub services: Vec<String>,
    pub address: Address,
}
