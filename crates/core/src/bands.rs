//! Cloud height bands and the horizon distances computed for them

use serde::{Deserialize, Serialize};

use crate::geo::{horizon_distance_km, EARTH_RADIUS_KM};

/// A named cloud altitude above the ground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudBand {
    pub name: String,
    pub height_m: f64,
    /// Display label, e.g. "Low Clouds 300m"
    #[serde(default)]
    pub label: Option<String>,
    /// Stroke color used for this band on the map
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "blue".to_string()
}

impl CloudBand {
    pub fn new(name: &str, height_m: f64, label: &str, color: &str) -> Self {
        CloudBand {
            name: name.to_string(),
            height_m,
            label: Some(label.to_string()),
            color: color.to_string(),
        }
    }

    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("{} {}m", self.name, self.height_m))
    }

    /// The five standard bands: low, middle and high cloud bases
    pub fn defaults() -> Vec<CloudBand> {
        vec![
            CloudBand::new("low min", 300.0, "Low Clouds 300m", "blue"),
            CloudBand::new("low max", 600.0, "Low Clouds 600m", "blue"),
            CloudBand::new("mid min", 1500.0, "Mid Clouds 1500m", "green"),
            CloudBand::new("mid max", 2500.0, "Mid Clouds 2500m", "green"),
            CloudBand::new("high", 6500.0, "High Clouds 6500m", "red"),
        ]
    }
}

/// Horizon distance for one band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandDistance {
    pub band: CloudBand,
    pub distance_km: f64,
}

/// Ordered band -> distance mapping. Order is the band list order so that
/// circles and labels are always produced in the same sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HorizonDistanceSet {
    pub elevation_m: f64,
    pub observer_height_m: f64,
    pub entries: Vec<BandDistance>,
}

impl HorizonDistanceSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BandDistance> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.band.name == name)
            .map(|e| e.distance_km)
    }

    /// Distance of the highest band. Sun lines are drawn a bit beyond it.
    pub fn highest(&self) -> Option<&BandDistance> {
        self.entries
            .iter()
            .max_by(|a, b| a.band.height_m.total_cmp(&b.band.height_m))
    }
}

/// Apply [`horizon_distance_km`] to every band, preserving band order.
pub fn compute_horizon_distance_set(
    elevation_m: f64,
    bands: &[CloudBand],
    observer_height_m: f64,
) -> HorizonDistanceSet {
    let entries = bands
        .iter()
        .map(|band| BandDistance {
            band: band.clone(),
            distance_km: horizon_distance_km(
                elevation_m,
                band.height_m,
                observer_height_m,
                EARTH_RADIUS_KM,
            ),
        })
        .collect();

    HorizonDistanceSet {
        elevation_m,
        observer_height_m,
        entries,
    }
}
