//! Spherical-earth geometry
//!
//! Horizon distance for an object at a given height and the great-circle
//! direct problem (start point + bearing + distance -> destination).
//! Nothing here validates its inputs: NaN and infinities flow through to the
//! caller unchanged.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Mean earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Eye height of a standing observer above the ground, in meters
pub const OBSERVER_HEIGHT_M: f64 = 1.7;

/// Roughly one degree of latitude, in kilometers. Used to place labels north of
/// the circle they describe.
pub const KM_PER_DEGREE_LAT: f64 = 111.0;

/// A point on the map in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    /// Build a position from user input, rejecting out-of-range coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, Error> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::Latitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(Error::Longitude(lon));
        }
        Ok(Position { lat, lon })
    }

    /// Map click handling works on coordinates rounded to two decimals
    /// (about 1 km), which is also the precision shown to the user.
    pub fn from_click(lat: f64, lon: f64) -> Result<Self, Error> {
        Position::new(round_to(lat, 2), round_to(lon, 2))
    }

    pub fn destination(&self, bearing_deg: f64, distance_km: f64) -> Position {
        let (lat, lon) = destination_point(
            self.lat,
            self.lon,
            bearing_deg,
            distance_km,
            EARTH_RADIUS_KM,
        );
        Position { lat, lon }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A bearing ray drawn from the observer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLine {
    pub start: Position,
    pub end: Position,
    pub bearing_deg: f64,
    pub length_km: f64,
}

/// Build the ray leaving `observer` along `bearing_deg` for `length_km`.
pub fn bearing_line(observer: Position, bearing_deg: f64, length_km: f64) -> DirectionalLine {
    DirectionalLine {
        start: observer,
        end: observer.destination(bearing_deg, length_km),
        bearing_deg,
        length_km,
    }
}

/// Distance in km at which an object `cloud_height_m` above the ground drops
/// below the horizon for an observer standing at `elevation_m`.
///
/// A negative total height produces NaN.
pub fn horizon_distance_km(
    elevation_m: f64,
    cloud_height_m: f64,
    observer_height_m: f64,
    earth_radius_km: f64,
) -> f64 {
    let total_height_m = elevation_m + observer_height_m + cloud_height_m;
    (2.0 * earth_radius_km * total_height_m / 1000.0).sqrt()
}

/// Point reached from (`lat`, `lon`) after travelling `distance_km` along the
/// great circle with initial bearing `bearing_deg` (clockwise from north).
///
/// Returns (lat, lon) in degrees. Longitude is not wrapped into [-180, 180].
pub fn destination_point(
    lat: f64,
    lon: f64,
    bearing_deg: f64,
    distance_km: f64,
    earth_radius_km: f64,
) -> (f64, f64) {
    let delta = distance_km / earth_radius_km;
    let theta = bearing_deg.to_radians();
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    (phi2.to_degrees(), lambda2.to_degrees())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
