//! Clouds Horizon Distance core library
//!
//! Pure calculations behind the cloud overlay:
//! - Horizon distance per cloud band and great-circle destination points
//! - Solar position, sunrise/sunset times and azimuths
//! - Overlay planning and the renderer seam
//! - Configuration loading (XDG-compliant)

pub mod bands;
mod config;
mod error;
pub mod geo;
pub mod overlay;
pub mod solar;

pub use bands::{compute_horizon_distance_set, BandDistance, CloudBand, HorizonDistanceSet};
pub use config::{find_config_file, load_config, ConfigSource};
pub use error::Error;
pub use geo::{
    bearing_line, destination_point, horizon_distance_km, DirectionalLine, Position,
    EARTH_RADIUS_KM, OBSERVER_HEIGHT_M,
};
pub use overlay::{
    InfoPanel, LayerId, MapRenderer, OverlayPlan, OverlaySet, SunLine, SunSide, EXTRA_LINE_KM,
};
pub use solar::{solar_azimuth_deg, sun_position, sun_times, sunrise_sunset, SolarEvent, SunTimes};

/// Application name used for XDG paths
pub const APP_NAME: &str = "horizon-distance";

/// Default open-elevation endpoint
pub const DEFAULT_ELEVATION_URL: &str = "https://api.open-elevation.com";

/// Default timeout of one elevation lookup, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
