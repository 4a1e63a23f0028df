//! Overlay planning
//!
//! Turns computed distances and sun events into map primitives (circles,
//! labels and lines) and defines the seam through which a map draws and later
//! removes them. A renderer hands back an [`OverlaySet`] for every draw; the
//! caller owns it and gives it back to remove exactly those layers.

use serde::Serialize;

use crate::bands::HorizonDistanceSet;
use crate::geo::{DirectionalLine, Position, KM_PER_DEGREE_LAT};
use crate::solar::SolarEvent;
use crate::Error;

/// Extra length of the sun lines beyond the highest cloud circle, km
pub const EXTRA_LINE_KM: f64 = 10.0;

pub const CIRCLE_DASH: &str = "5, 5";
pub const CIRCLE_WEIGHT: u32 = 2;
pub const SUNRISE_COLOR: &str = "yellow";
pub const SUNSET_COLOR: &str = "orange";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub dash_array: Option<String>,
    pub weight: u32,
    pub fill_opacity: f64,
}

impl Stroke {
    fn dashed(color: &str) -> Self {
        Stroke {
            color: color.to_string(),
            dash_array: Some(CIRCLE_DASH.to_string()),
            weight: CIRCLE_WEIGHT,
            fill_opacity: 0.0,
        }
    }

    fn solid(color: &str) -> Self {
        Stroke {
            color: color.to_string(),
            dash_array: None,
            weight: 3,
            fill_opacity: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub center: Position,
    pub radius_m: f64,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub at: Position,
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SunSide {
    Sunrise,
    Sunset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunLine {
    pub side: SunSide,
    pub event: SolarEvent,
    pub line: DirectionalLine,
    pub stroke: Stroke,
}

/// Everything one click wants drawn, in drawing order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayPlan {
    pub observer: Position,
    pub panel: InfoPanel,
    pub circles: Vec<Circle>,
    pub labels: Vec<Label>,
    pub sun_lines: Vec<SunLine>,
}

impl OverlayPlan {
    /// One dashed circle and one label per band, plus a ray towards sunrise
    /// and sunset reaching `extra_km` beyond the highest band's circle.
    pub fn build(
        observer: Position,
        distances: &HorizonDistanceSet,
        sunrise: Option<SolarEvent>,
        sunset: Option<SolarEvent>,
        extra_km: f64,
    ) -> OverlayPlan {
        let mut circles = Vec::with_capacity(distances.len());
        let mut labels = Vec::with_capacity(distances.len());

        for entry in distances.iter() {
            circles.push(Circle {
                center: observer,
                radius_m: entry.distance_km * 1000.0,
                stroke: Stroke::dashed(&entry.band.color),
            });
            labels.push(Label {
                at: Position {
                    lat: observer.lat + entry.distance_km / KM_PER_DEGREE_LAT,
                    lon: observer.lon,
                },
                text: format!(
                    "{} ({}km)",
                    entry.band.label(),
                    entry.distance_km.round()
                ),
                color: entry.band.color.clone(),
            });
        }

        let line_km = distances
            .highest()
            .map(|h| h.distance_km)
            .unwrap_or_default()
            + extra_km;

        let sun_lines = [
            (SunSide::Sunrise, sunrise, SUNRISE_COLOR),
            (SunSide::Sunset, sunset, SUNSET_COLOR),
        ]
        .into_iter()
        .filter_map(|(side, event, color)| {
            event.map(|event| SunLine {
                side,
                event,
                line: event.line_from(observer, line_km),
                stroke: Stroke::solid(color),
            })
        })
        .collect();

        OverlayPlan {
            observer,
            panel: InfoPanel::new(observer, distances),
            circles,
            labels,
            sun_lines,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.circles.len() + self.labels.len() + self.sun_lines.len()
    }
}

/// Handle of one layer a renderer put on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// The layers produced by one draw call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySet {
    pub circles: Vec<LayerId>,
    pub labels: Vec<LayerId>,
    pub lines: Vec<LayerId>,
}

impl OverlaySet {
    pub fn len(&self) -> usize {
        self.circles.len() + self.labels.len() + self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All handles, in the order they were drawn
    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.circles
            .iter()
            .chain(self.labels.iter())
            .chain(self.lines.iter())
            .copied()
    }
}

/// Something that can put an [`OverlayPlan`] on a map and take it off again
pub trait MapRenderer {
    fn draw(&mut self, plan: &OverlayPlan) -> Result<OverlaySet, Error>;
    fn remove(&mut self, set: OverlaySet) -> Result<(), Error>;
}

impl<R: MapRenderer + ?Sized> MapRenderer for Box<R> {
    fn draw(&mut self, plan: &OverlayPlan) -> Result<OverlaySet, Error> {
        (**self).draw(plan)
    }

    fn remove(&mut self, set: OverlaySet) -> Result<(), Error> {
        (**self).remove(set)
    }
}

/// Values shown next to the map for the last click
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoPanel {
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub rows: Vec<(String, f64)>,
}

impl InfoPanel {
    pub fn new(observer: Position, distances: &HorizonDistanceSet) -> Self {
        InfoPanel {
            lat: observer.lat,
            lon: observer.lon,
            elevation_m: distances.elevation_m,
            rows: distances
                .iter()
                .map(|e| (e.band.label(), e.distance_km))
                .collect(),
        }
    }
}

impl std::fmt::Display for InfoPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Position")?;
        writeln!(f, "  Latitude: {}", self.lat)?;
        writeln!(f, "  Longitude: {}", self.lon)?;
        writeln!(f, "Elevation: {} m", self.elevation_m)?;
        writeln!(f, "Horizon Distance (Clouds)")?;
        for (label, km) in &self.rows {
            writeln!(f, "  {}: {:.2} km", label, km)?;
        }
        Ok(())
    }
}
