//! Great-circle distance between property coordinates.

use comp_scout_property_models::PropertyRecord;
use geo::{Distance, Haversine, Point};

const METERS_PER_MILE: f64 = 1_609.344;

/// Spherical-earth (Haversine) distance in miles between two coordinate
/// pairs, given as `(latitude, longitude)` in WGS84 decimal degrees.
#[must_use]
pub fn miles_between(a: (f64, f64), b: (f64, f64)) -> f64 {
    let p1 = Point::new(a.1, a.0);
    let p2 = Point::new(b.1, b.0);
    Haversine.distance(p1, p2) / METERS_PER_MILE
}

/// Distance in miles between two property records.
#[must_use]
pub fn miles_between_records(a: &PropertyRecord, b: &PropertyRecord) -> f64 {
    miles_between((a.latitude, a.longitude), (b.latitude, b.longitude))
}
