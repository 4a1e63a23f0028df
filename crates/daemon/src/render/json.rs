use horizon_core::{
    overlay::{Circle, Label},
    Error, LayerId, MapRenderer, OverlayPlan, OverlaySet, SunLine,
};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Layer<'a> {
    Circle(&'a Circle),
    Label(&'a Label),
    Line(&'a SunLine),
}

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Command<'a> {
    Add { id: LayerId, layer: Layer<'a> },
    Remove { id: LayerId },
}

/// Writes one JSON layer command per line, for a map front-end to replay
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    next_id: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        JsonLinesRenderer { out, next_id: 1 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, command: &Command) -> Result<(), Error> {
        serde_json::to_writer(&mut self.out, command).map_err(|e| Error::Render(e.to_string()))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn add(&mut self, layer: Layer) -> Result<LayerId, Error> {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.emit(&Command::Add { id, layer })?;
        Ok(id)
    }
}

impl<W: Write> MapRenderer for JsonLinesRenderer<W> {
    fn draw(&mut self, plan: &OverlayPlan) -> Result<OverlaySet, Error> {
        let mut set = OverlaySet::default();
        for circle in &plan.circles {
            set.circles.push(self.add(Layer::Circle(circle))?);
        }
        for label in &plan.labels {
            set.labels.push(self.add(Layer::Label(label))?);
        }
        for line in &plan.sun_lines {
            set.lines.push(self.add(Layer::Line(line))?);
        }
        self.out.flush()?;
        Ok(set)
    }

    fn remove(&mut self, set: OverlaySet) -> Result<(), Error> {
        for id in set.layers() {
            self.emit(&Command::Remove { id })?;
        }
        self.out.flush()?;
        Ok(())
    }
}
