use horizon_core::{Error, MapRenderer, OverlayPlan, OverlaySet};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use slog::{debug, Logger};
use std::fs;

use crate::create_parent_folder;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Wraps another renderer and keeps an HTML page of the current overlay at
/// `path`, rewritten after every draw and remove.
pub struct HtmlSnapshot<R: MapRenderer> {
    logger: Logger,
    path: String,
    inner: R,
}

impl<R: MapRenderer> HtmlSnapshot<R> {
    pub fn new(logger: Logger, path: &str, inner: R) -> Self {
        create_parent_folder(path, &logger);
        HtmlSnapshot {
            logger,
            path: path.to_string(),
            inner,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn write(&self, page: Markup) -> Result<(), Error> {
        fs::write(&self.path, page.into_string())?;
        debug!(self.logger, "map page written to {}", self.path);
        Ok(())
    }
}

impl<R: MapRenderer> MapRenderer for HtmlSnapshot<R> {
    fn draw(&mut self, plan: &OverlayPlan) -> Result<OverlaySet, Error> {
        let set = self.inner.draw(plan)?;
        self.write(map_page(Some(plan))?)?;
        Ok(set)
    }

    fn remove(&mut self, set: OverlaySet) -> Result<(), Error> {
        self.inner.remove(set)?;
        self.write(map_page(None)?)
    }
}

/// Full page with a Leaflet map, the overlay and the info box
pub fn map_page(plan: Option<&OverlayPlan>) -> Result<Markup, Error> {
    let data = match plan {
        Some(plan) => serde_json::to_string(plan).map_err(|e| Error::Render(e.to_string()))?,
        None => "null".to_string(),
    };
    // keep the embedded JSON from closing the script tag
    let data = data.replace("</", "<\\/");

    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Clouds Horizon Distance" }
                link rel="stylesheet" href=(LEAFLET_CSS);
                script src=(LEAFLET_JS) {}
                style { (PreEscaped(PAGE_STYLE)) }
            }
            body {
                div id="map" {}
                @if let Some(plan) = plan {
                    (info_box(plan))
                }
                script {
                    (PreEscaped(format!("const PLAN = {};", data)))
                    (PreEscaped(MAP_SCRIPT))
                }
            }
        }
    })
}

fn info_box(plan: &OverlayPlan) -> Markup {
    let panel = &plan.panel;
    html! {
        div id="info-box" {
            fieldset {
                legend { "Position" }
                p { "Latitude: " (panel.lat) }
                p { "Longitude: " (panel.lon) }
            }
            fieldset {
                legend { "Elevation" }
                p { (panel.elevation_m) " m" }
            }
            fieldset {
                legend { "Horizon Distance (Clouds)" }
                @for (label, km) in &panel.rows {
                    p { (label) ": " (format!("{:.2}", km)) " km" }
                }
            }
        }
    }
}

const PAGE_STYLE: &str = r#"
html, body, #map { height: 100%; margin: 0; }
#info-box {
    position: absolute; top: 10px; right: 10px; z-index: 1000;
    background: white; padding: 8px; font: 13px sans-serif;
}
#info-box p { margin: 2px 0; }
"#;

const MAP_SCRIPT: &str = r#"
const map = L.map('map');
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
if (PLAN) {
    const center = [PLAN.observer.lat, PLAN.observer.lon];
    map.setView(center, 8);
    for (const c of PLAN.circles) {
        L.circle([c.center.lat, c.center.lon], {
            radius: c.radius_m, color: c.stroke.color, weight: c.stroke.weight,
            dashArray: c.stroke.dash_array, fillOpacity: c.stroke.fill_opacity
        }).addTo(map);
    }
    for (const l of PLAN.labels) {
        const span = document.createElement('span');
        span.textContent = l.text;
        span.style.color = l.color;
        L.marker([l.at.lat, l.at.lon], {
            icon: L.divIcon({ className: 'band-label', html: span })
        }).addTo(map);
    }
    for (const s of PLAN.sun_lines) {
        L.polyline([[s.line.start.lat, s.line.start.lon], [s.line.end.lat, s.line.end.lon]], {
            color: s.stroke.color, weight: s.stroke.weight
        }).addTo(map);
    }
} else {
    map.setView([0, 0], 2);
}
"#;
