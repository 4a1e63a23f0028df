//! Solar position and sun times
//!
//! Low-precision solar ephemeris based on the formulas published at
//! <http://aa.quae.nl/en/reken/zonpositie.html>: days since J2000, mean
//! anomaly, equation of center, ecliptic longitude, then equatorial
//! coordinates and the local hour angle. Accuracy is in the order of a
//! minute of time, which is far below what a map overlay can show.

use std::f64::consts::PI;

use serde::Serialize;
use time::OffsetDateTime;

use crate::geo::{bearing_line, DirectionalLine, Position};

const DAY_MS: f64 = 1000.0 * 60.0 * 60.0 * 24.0;
const J1970: f64 = 2440588.0;
const J2000: f64 = 2451545.0;
const J0: f64 = 0.0009;

/// Obliquity of the ecliptic, radians
const OBLIQUITY: f64 = 23.4397 * PI / 180.0;

/// Sun altitude (degrees) at which the upper limb touches the horizon,
/// refraction included.
pub const SUNRISE_ALTITUDE_DEG: f64 = -0.833;

/// Azimuth and altitude of the sun in radians.
///
/// Azimuth is measured from south, positive towards west, in [-π, π].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub azimuth: f64,
    pub altitude: f64,
}

impl SunPosition {
    /// Compass bearing of the sun, degrees clockwise from north in [0, 360)
    pub fn compass_azimuth_deg(&self) -> f64 {
        (self.azimuth.to_degrees() + 180.0).rem_euclid(360.0)
    }
}

/// A sunrise or sunset: when it happens and where on the horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarEvent {
    pub azimuth_deg: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl SolarEvent {
    /// Ray from `observer` pointing at this event
    pub fn line_from(&self, observer: Position, length_km: f64) -> DirectionalLine {
        bearing_line(observer, self.azimuth_deg, length_km)
    }
}

/// A pair of events defined by one sun altitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseSet {
    pub altitude_deg: f64,
    pub rise: Option<OffsetDateTime>,
    pub set: Option<OffsetDateTime>,
}

/// Sun times for one day. Events that do not happen on that day at that
/// latitude (polar day, polar night) are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub solar_noon: Option<OffsetDateTime>,
    pub nadir: Option<OffsetDateTime>,
    /// sunrise / sunset
    pub sun: RiseSet,
    /// sunrise end / sunset start
    pub sun_disc: RiseSet,
    /// dawn / dusk
    pub civil: RiseSet,
    pub nautical: RiseSet,
    /// night end / night
    pub astronomical: RiseSet,
    /// golden hour end / golden hour
    pub golden_hour: RiseSet,
}

impl SunTimes {
    pub fn sunrise(&self) -> Option<OffsetDateTime> {
        self.sun.rise
    }

    pub fn sunset(&self) -> Option<OffsetDateTime> {
        self.sun.set
    }
}

fn to_julian(instant: OffsetDateTime) -> f64 {
    let ms = instant.unix_timestamp_nanos() as f64 / 1_000_000.0;
    ms / DAY_MS - 0.5 + J1970
}

fn from_julian(j: f64) -> Option<OffsetDateTime> {
    let nanos = (j + 0.5 - J1970) * DAY_MS * 1_000_000.0;
    if !nanos.is_finite() {
        return None;
    }
    OffsetDateTime::from_unix_timestamp_nanos(nanos.round() as i128).ok()
}

fn to_days(instant: OffsetDateTime) -> f64 {
    to_julian(instant) - J2000
}

fn right_ascension(l: f64, b: f64) -> f64 {
    (l.sin() * OBLIQUITY.cos() - b.tan() * OBLIQUITY.sin()).atan2(l.cos())
}

fn declination(l: f64, b: f64) -> f64 {
    (b.sin() * OBLIQUITY.cos() + b.cos() * OBLIQUITY.sin() * l.sin()).asin()
}

fn azimuth(h: f64, phi: f64, dec: f64) -> f64 {
    h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos())
}

fn altitude(h: f64, phi: f64, dec: f64) -> f64 {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin()
}

fn sidereal_time(d: f64, lw: f64) -> f64 {
    (280.16 + 360.9856235 * d).to_radians() - lw
}

fn solar_mean_anomaly(d: f64) -> f64 {
    (357.5291 + 0.98560028 * d).to_radians()
}

fn ecliptic_longitude(m: f64) -> f64 {
    // equation of center
    let c = (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin()).to_radians();
    // perihelion of the earth
    let p = 102.9372_f64.to_radians();
    m + c + p + PI
}

/// Sun position in radians for an observer at `lat`/`lon` (degrees).
pub fn sun_position(instant: OffsetDateTime, lat: f64, lon: f64) -> SunPosition {
    let lw = (-lon).to_radians();
    let phi = lat.to_radians();
    let d = to_days(instant);

    let m = solar_mean_anomaly(d);
    let l = ecliptic_longitude(m);
    let dec = declination(l, 0.0);
    let ra = right_ascension(l, 0.0);
    let h = sidereal_time(d, lw) - ra;

    SunPosition {
        azimuth: azimuth(h, phi, dec),
        altitude: altitude(h, phi, dec),
    }
}

/// Compass bearing of the sun in degrees, [0, 360) clockwise from north.
pub fn solar_azimuth_deg(lat: f64, lon: f64, instant: OffsetDateTime) -> f64 {
    sun_position(instant, lat, lon).compass_azimuth_deg()
}

fn julian_cycle(d: f64, lw: f64) -> f64 {
    // JS Math.round: halves go towards +∞
    (d - J0 - lw / (2.0 * PI) + 0.5).floor()
}

fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / (2.0 * PI) + n
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

fn hour_angle(h: f64, phi: f64, dec: f64) -> f64 {
    ((h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos())).acos()
}

/// Dip of the horizon in degrees for an observer `height_m` above it
fn observer_angle(height_m: f64) -> f64 {
    -2.076 * height_m.sqrt() / 60.0
}

/// Sun times for the day containing `instant` at `lat`/`lon`, with the horizon
/// lowered for an observer `height_m` above it.
pub fn sun_times(instant: OffsetDateTime, lat: f64, lon: f64, height_m: f64) -> SunTimes {
    let lw = (-lon).to_radians();
    let phi = lat.to_radians();
    let dh = observer_angle(height_m);

    let d = to_days(instant);
    let n = julian_cycle(d, lw);
    let ds = approx_transit(0.0, lw, n);

    let m = solar_mean_anomaly(ds);
    let l = ecliptic_longitude(m);
    let dec = declination(l, 0.0);

    let j_noon = solar_transit_j(ds, m, l);

    let rise_set = |altitude_deg: f64| {
        let h0 = (altitude_deg + dh).to_radians();
        let w = hour_angle(h0, phi, dec);
        let j_set = solar_transit_j(approx_transit(w, lw, n), m, l);
        let j_rise = j_noon - (j_set - j_noon);
        RiseSet {
            altitude_deg,
            rise: from_julian(j_rise),
            set: from_julian(j_set),
        }
    };

    SunTimes {
        solar_noon: from_julian(j_noon),
        nadir: from_julian(j_noon - 0.5),
        sun: rise_set(SUNRISE_ALTITUDE_DEG),
        sun_disc: rise_set(-0.3),
        civil: rise_set(-6.0),
        nautical: rise_set(-12.0),
        astronomical: rise_set(-18.0),
        golden_hour: rise_set(6.0),
    }
}

/// Sunrise and sunset for the day containing `instant`, each with the compass
/// azimuth of the sun at that moment.
pub fn sunrise_sunset(
    lat: f64,
    lon: f64,
    instant: OffsetDateTime,
) -> (Option<SolarEvent>, Option<SolarEvent>) {
    let times = sun_times(instant, lat, lon, 0.0);
    let event = |timestamp: OffsetDateTime| SolarEvent {
        azimuth_deg: solar_azimuth_deg(lat, lon, timestamp),
        timestamp,
    };
    (times.sunrise().map(event), times.sunset().map(event))
}
