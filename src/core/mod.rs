// Core search exports
pub mod controller;
pub mod geo;
pub mod state;

pub use controller::{ControllerConfig, SearchOutcome, ViewportSearchController};
pub use geo::{radius_from_bounds, validated_radius, METERS_PER_DEGREE_LAT};
pub use state::{SearchAction, SearchState};
