//! Station Locator - viewport-driven station search
//!
//! This library keeps a displayed set of stations in step with a map
//! viewport. Settle events are turned into radius searches against a remote
//! backend, and only the most recently issued search may update the shared
//! result state.
//!
//! The `station-locator` binary serves the pass-through HTTP route that
//! forwards searches to the backend.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    radius_from_bounds, ControllerConfig, SearchAction, SearchOutcome, SearchState,
    ViewportSearchController,
};
pub use models::{Address, Coordinate, SearchQuery, Station, ValidationError, ViewportBounds};
pub use services::{GatewayError, SearchGateway, StationApiClient};
