use anyhow::{anyhow, Error};
use horizon_core::{
    compute_horizon_distance_set, sunrise_sunset, CloudBand, MapRenderer, OverlayPlan,
    OverlaySet, Position,
};
use slog::{debug, error, info, Logger};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::{Cli, ElevationSource};

/// One click on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub lat: f64,
    pub lon: f64,
    /// When the click happened; sun times are computed for this day
    pub at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct ClickSettings {
    pub bands: Vec<CloudBand>,
    pub observer_height_m: f64,
    pub extra_line_km: f64,
}

impl From<&Cli> for ClickSettings {
    fn from(cli: &Cli) -> Self {
        ClickSettings {
            bands: cli.bands(),
            observer_height_m: cli.observer_height_m(),
            extra_line_km: cli.extra_line_km(),
        }
    }
}

impl Default for ClickSettings {
    fn default() -> Self {
        ClickSettings::from(&Cli::default())
    }
}

/// Turns a click into an [`OverlayPlan`]. Cheap to clone, one clone per
/// in-flight click.
#[derive(Clone)]
pub struct Planner {
    logger: Logger,
    source: Arc<dyn ElevationSource>,
    settings: Arc<ClickSettings>,
}

impl Planner {
    pub fn new(logger: Logger, source: Arc<dyn ElevationSource>, settings: ClickSettings) -> Self {
        Planner {
            logger,
            source,
            settings: Arc::new(settings),
        }
    }

    /// Fetch the elevation under the click and compute everything to draw.
    /// A failed lookup aborts the click.
    pub async fn plan(&self, click: &Click) -> Result<OverlayPlan, Error> {
        let observer = Position::from_click(click.lat, click.lon)?;
        let at = click.at.unwrap_or_else(OffsetDateTime::now_utc);

        let elevation_m = self
            .source
            .elevation(observer.lat, observer.lon)
            .await
            .map_err(|e| anyhow!("Failed to process click at {}: {}", observer, e))?;
        debug!(self.logger, "elevation at {}: {} m", observer, elevation_m);

        let distances = compute_horizon_distance_set(
            elevation_m,
            &self.settings.bands,
            self.settings.observer_height_m,
        );
        let (sunrise, sunset) = sunrise_sunset(observer.lat, observer.lon, at);
        if sunrise.is_none() || sunset.is_none() {
            info!(
                self.logger,
                "no sunrise or sunset at {} on {}, skipping sun lines",
                observer,
                at.date()
            );
        }

        Ok(OverlayPlan::build(
            observer,
            &distances,
            sunrise,
            sunset,
            self.settings.extra_line_km,
        ))
    }
}

/// Owns the renderer and whatever is currently drawn on it
pub struct ClickSession<R: MapRenderer> {
    logger: Logger,
    renderer: R,
    current: Option<OverlaySet>,
}

impl<R: MapRenderer> ClickSession<R> {
    pub fn new(logger: Logger, renderer: R) -> Self {
        ClickSession {
            logger,
            renderer,
            current: None,
        }
    }

    /// Replace the current overlay with `plan`. Returns the number of layers
    /// drawn. If the current overlay cannot be removed, nothing is drawn and
    /// it stays current.
    pub fn apply(&mut self, plan: &OverlayPlan) -> Result<usize, Error> {
        self.clear()?;
        let set = self.renderer.draw(plan)?;
        let drawn = set.len();
        info!(
            self.logger,
            "drew {} layers around {} (elevation {} m)",
            drawn,
            plan.observer,
            plan.panel.elevation_m
        );
        self.current = Some(set);
        Ok(drawn)
    }

    /// Plan and draw one click. On failure nothing on the map changes.
    pub async fn handle_click(&mut self, planner: &Planner, click: Click) -> Result<usize, Error> {
        match planner.plan(&click).await {
            Ok(plan) => self.apply(&plan),
            Err(err) => {
                error!(self.logger, "{}", err);
                Err(err)
            }
        }
    }

    fn clear(&mut self) -> Result<(), Error> {
        if let Some(previous) = self.current.take() {
            debug!(self.logger, "removing {} layers", previous.len());
            // a set that failed to come off the map stays owned for the next try
            if let Err(err) = self.renderer.remove(previous.clone()) {
                self.current = Some(previous);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Remove everything this session drew
    pub fn close(&mut self) -> Result<(), Error> {
        self.clear()
    }

    pub fn current(&self) -> Option<&OverlaySet> {
        self.current.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
