// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Address, Coordinate, SearchQuery, Station, ValidationError, ViewportBounds};
pub use requests::{BackendSearchParams, StationSearchParams};
pub use responses::{
    AddressRecord, BackendErrorBody, ErrorResponse, HealthResponse,
    StationRecord, StationsEnvelope, StationsPayload,
};
