// Service exports
pub mod gateway;
pub mod station_api;

pub use gateway::{GatewayError, SearchGateway};
pub use station_api::{StationApiClient, DEFAULT_BACKEND_ERROR};
