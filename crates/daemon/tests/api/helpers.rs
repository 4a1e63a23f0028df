use async_trait::async_trait;
use horizon_core::{Error, LayerId, MapRenderer, OverlayPlan, OverlaySet, Position};
use horizon_daemon::{ClickSession, ClickSettings, ElevationError, ElevationSource, Planner};
use mockall::mock;
use slog::{o, Discard, Logger};
use std::sync::Arc;

mock! {
    pub Elevation {}

    #[async_trait]
    impl ElevationSource for Elevation {
        async fn elevation(&self, lat: f64, lon: f64) -> Result<f64, ElevationError>;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Draw { observer: Position, ids: Vec<LayerId> },
    Remove(Vec<LayerId>),
}

/// Hands out sequential ids and remembers every successful call.
/// `fail_draw` / `fail_remove` make that call number (1-based) fail.
#[derive(Default)]
pub struct RecordingRenderer {
    pub next_id: u64,
    pub draw_calls: usize,
    pub remove_calls: usize,
    pub fail_draw: Option<usize>,
    pub fail_remove: Option<usize>,
    pub ops: Vec<Op>,
}

impl RecordingRenderer {
    pub fn draws(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Draw { .. }))
            .count()
    }

    pub fn removes(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Remove(_)))
            .count()
    }
}

impl MapRenderer for RecordingRenderer {
    fn draw(&mut self, plan: &OverlayPlan) -> Result<OverlaySet, Error> {
        self.draw_calls += 1;
        if self.fail_draw == Some(self.draw_calls) {
            return Err(Error::Render("broken pipe".to_string()));
        }
        let mut next = || {
            self.next_id += 1;
            LayerId(self.next_id)
        };
        let set = OverlaySet {
            circles: plan.circles.iter().map(|_| next()).collect(),
            labels: plan.labels.iter().map(|_| next()).collect(),
            lines: plan.sun_lines.iter().map(|_| next()).collect(),
        };
        self.ops.push(Op::Draw {
            observer: plan.observer,
            ids: set.layers().collect(),
        });
        Ok(set)
    }

    fn remove(&mut self, set: OverlaySet) -> Result<(), Error> {
        self.remove_calls += 1;
        if self.fail_remove == Some(self.remove_calls) {
            return Err(Error::Render("layer still busy".to_string()));
        }
        self.ops.push(Op::Remove(set.layers().collect()));
        Ok(())
    }
}

pub fn test_logger() -> Logger {
    Logger::root(Discard, o!())
}

pub fn planner(source: MockElevation) -> Planner {
    Planner::new(test_logger(), Arc::new(source), ClickSettings::default())
}

pub fn session() -> ClickSession<RecordingRenderer> {
    session_with(RecordingRenderer::default())
}

pub fn session_with(renderer: RecordingRenderer) -> ClickSession<RecordingRenderer> {
    ClickSession::new(test_logger(), renderer)
}
