//! Geofence math.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default geofence radius for attendance and trip endpoint checks.
pub const DEFAULT_GEOFENCE_RADIUS_M: f64 = 100.0;

/// A WGS-84 coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Great-circle distance between two points in meters (haversine).
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// True when `point` lies within `radius_m` meters of `center`.
/// The boundary counts as inside.
pub fn within_range(point: GeoPoint, center: GeoPoint, radius_m: f64) -> bool {
    distance_meters(point, center) <= radius_m
}

/// Outcome of a geofence verification.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeofenceCheck {
    pub distance_m: f64,
    pub radius_m: f64,
    pub within_range: bool,
}

/// Measure `point` against a circular fence around `center`.
pub fn check(point: GeoPoint, center: GeoPoint, radius_m: f64) -> GeofenceCheck {
    let distance_m = distance_meters(point, center);
    GeofenceCheck {
        distance_m,
        radius_m,
        within_range: distance_m <= radius_m,
    }
}
