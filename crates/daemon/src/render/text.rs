use horizon_core::{Error, LayerId, MapRenderer, OverlayPlan, OverlaySet, SunSide};
use std::io::Write;
use time::macros::format_description;

/// Prints the info panel and sun directions of every drawn plan
pub struct TextRenderer<W: Write> {
    out: W,
    next_id: u64,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out, next_id: 1 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn ids(&mut self, count: usize) -> Vec<LayerId> {
        let ids = (self.next_id..self.next_id + count as u64)
            .map(LayerId)
            .collect();
        self.next_id += count as u64;
        ids
    }
}

impl<W: Write> MapRenderer for TextRenderer<W> {
    fn draw(&mut self, plan: &OverlayPlan) -> Result<OverlaySet, Error> {
        let hhmm = format_description!("[hour]:[minute] UTC");

        write!(self.out, "{}", plan.panel)?;
        writeln!(self.out, "Sun")?;
        for sun in &plan.sun_lines {
            let name = match sun.side {
                SunSide::Sunrise => "Sunrise",
                SunSide::Sunset => "Sunset",
            };
            let at = sun
                .event
                .timestamp
                .format(&hhmm)
                .map_err(|e| Error::Render(e.to_string()))?;
            writeln!(
                self.out,
                "  {}: {} towards {:.1}°",
                name, at, sun.event.azimuth_deg
            )?;
        }
        if plan.sun_lines.is_empty() {
            writeln!(self.out, "  no sunrise or sunset on this day")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;

        Ok(OverlaySet {
            circles: self.ids(plan.circles.len()),
            labels: self.ids(plan.labels.len()),
            lines: self.ids(plan.sun_lines.len()),
        })
    }

    fn remove(&mut self, _set: OverlaySet) -> Result<(), Error> {
        Ok(())
    }
}
