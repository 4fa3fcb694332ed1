use serde::{Deserialize, Serialize};

use crate::models::domain::{Address, Coordinate, Station};

/// Successful backend body: `{ "results": [...] }`
///
/// `results` is required; a body without it is not a station list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsEnvelope<T> {
    pub results: Vec<T>,
}

/// Body the gateway accepts on success.
///
/// The backend wraps results in an envelope while the local pass-through
/// returns the bare array, so either shape is read.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StationsPayload {
    Envelope(StationsEnvelope<StationRecord>),
    Bare(Vec<StationRecord>),
}

impl StationsPayload {
    pub fn into_records(self) -> Vec<StationRecord> {
        match self {
            StationsPayload::Envelope(envelope) => envelope.results,
            StationsPayload::Bare(records) => records,
        }
    }
}

/// Optional failure body: `{ "error": "..." }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Station as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(rename = "stationId")]
    pub station_id: String,
    pub name: String,
    #[serde(default)]
    pub services: Vec<String>,
    pub address: AddressRecord,
}

/// Address as it appears on the wire; coordinates are decimal strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(rename = "streetLine1")]
    pub street_line_1: String,
    #[serde(rename = "streetLine2", default)]
    pub street_line_2: Option<String>,
    #[serde(rename = "streetLine3", default)]
    pub street_line_3: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub country: String,
    pub latitude: String,
    pub longitude: String,
}

impl TryFrom<StationRecord> for Station {
    type Error = String;

    fn try_from(record: StationRecord) -> Result<Self, Self::Error> {
        let address = record.address;
        let latitude: f64 = address.latitude.trim().parse().map_err(|_| {
            format!(
                "station {}: invalid latitude {:?}",
                record.station_id, address.latitude
            )
        })?;
        let longitude: f64 = address.longitude.trim().parse().map_err(|_| {
            format!(
                "station {}: invalid longitude {:?}",
                record.station_id, address.longitude
            )
        })?;
        let location = Coordinate::new(latitude, longitude)
            .map_err(|e| format!("station {}: {}", record.station_id, e))?;

        Ok(Station {
            id: record.station_id,
            name: record.name,
            services: record.services,
            address: Address {
                street_line_1: address.street_line_1,
                street_line_2: address.street_line_2,
                street_line_3: address.street_line_3,
                city: address.city,
                region: address.state,
                postal_code: address.postal_code,
                country: address.country,
                location,
            },
        })
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
