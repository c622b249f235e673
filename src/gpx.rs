use crate::render;
use crate::types::{Coords, Workout};
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";

/// Writes every workout as a GPX waypoint, preceded by `home` when known.
pub fn write_waypoints<W: Write>(workouts: &[Workout], home: Option<Coords>, out: W) -> Result<()> {
    let mut xml = Writer::new_with_indent(out, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(BytesStart::new("gpx").with_attributes([
        ("version", "1.1"),
        ("creator", env!("CARGO_PKG_NAME")),
        ("xmlns", GPX_NS),
    ])))?;

    if let Some(c) = home {
        write_wpt(&mut xml, c, &[("name", "Current position"), ("type", "position")])?;
    }

    for w in workouts {
        let time = w
            .created_at()
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let desc = render::metrics_line(w);
        write_wpt(
            &mut xml,
            w.coords(),
            &[
                ("time", time.as_str()),
                ("name", w.description()),
                ("desc", desc.as_str()),
                ("type", w.kind().as_str()),
            ],
        )?;
    }

    xml.write_event(Event::End(BytesEnd::new("gpx")))?;
    Ok(())
}

fn write_wpt<W: Write>(xml: &mut Writer<W>, at: Coords, children: &[(&str, &str)]) -> Result<()> {
    let lat = at.lat.to_string();
    let lon = at.lng.to_string();
    xml.write_event(Event::Start(
        BytesStart::new("wpt").with_attributes([("lat", lat.as_str()), ("lon", lon.as_str())]),
    ))?;
    for (tag, text) in children {
        xml.write_event(Event::Start(BytesStart::new(*tag)))?;
        xml.write_event(Event::Text(BytesText::new(text)))?;
        xml.write_event(Event::End(BytesEnd::new(*tag)))?;
    }
    xml.write_event(Event::End(BytesEnd::new("wpt")))?;
    Ok(())
}

pub fn export_to_path(workouts: &[Workout], home: Option<Coords>, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating GPX file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_waypoints(workouts, home, &mut out)
        .with_context(|| format!("writing GPX file: {}", path.display()))?;
    out.flush()
        .with_context(|| format!("flushing GPX file: {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        waypoints = workouts.len() + usize::from(home.is_some()),
        "gpx exported"
    );
    Ok(())
}
