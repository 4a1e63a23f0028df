use anyhow::{anyhow, Error};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::Click;

/// Parse one click event line: `lat,lon`, `lat lon` or either followed by an
/// RFC3339 instant. Blank lines and `#` comments yield `None`.
pub fn parse_click(line: &str) -> Result<Option<Click>, Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(anyhow!(
            "expected 'lat,lon[,instant]', got {} fields in '{}'",
            fields.len(),
            line
        ));
    }

    let lat: f64 = fields[0]
        .parse()
        .map_err(|_| anyhow!("invalid latitude: {}", fields[0]))?;
    let lon: f64 = fields[1]
        .parse()
        .map_err(|_| anyhow!("invalid longitude: {}", fields[1]))?;
    let at = match fields.get(2) {
        Some(raw) => Some(
            OffsetDateTime::parse(raw, &Rfc3339)
                .map_err(|e| anyhow!("invalid instant {}: {}", raw, e))?,
        ),
        None => None,
    };

    Ok(Some(Click { lat, lon, at }))
}
