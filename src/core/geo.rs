use crate::models::{ValidationError, ViewportBounds};

/// Meters per degree of latitude.
///
/// Equirectangular approximation; no geodesic correction is applied.
pub const METERS_PER_DEGREE_LAT: f64 = 111_000.0;

/// Search radius for a viewport: half its north-south extent in meters
///
/// Pure and deterministic. Returns a negative value when `north < south`;
/// use [`validated_radius`] to reject those.
#[inline]
pub fn radius_from_bounds(bounds: &ViewportBounds) -> f64 {
    (bounds.north - bounds.south) * METERS_PER_DEGREE_LAT / 2.0
}

/// [`radius_from_bounds`], rejecting non-finite and non-positive radii
pub fn validated_radius(bounds: &ViewportBounds) -> Result<f64, ValidationError> {
    let radius = radius_from_bounds(bounds);
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(ValidationError::DegenerateRadius(radius))
    }
}
