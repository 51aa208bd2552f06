use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use super::SampleSeries;
use crate::error::PlannerError;
use crate::models::{LineCategory, ThinningEvent, ThinningTrack};

/// CSV row of a digitized sample: the line it belongs to and one point.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct SampleRow {
    line: String,
    x: f64,
    y: f64,
}

#[derive(Debug, serde::Serialize)]
struct EventRow {
    age: f64,
    value_before: f64,
    value_after: f64,
    removed: f64,
}

#[derive(Debug, serde::Serialize)]
struct TrackRow {
    age: f64,
    value: f64,
}

fn parse_csv_records<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<SampleSeries>, PlannerError> {
    let mut lines: BTreeMap<String, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

    for result in rdr.deserialize() {
        let row: SampleRow = result?;
        if !(row.x.is_finite() && row.y.is_finite()) {
            return Err(PlannerError::ParseError(format!(
                "'{}': non-finite point ({}, {})",
                row.line, row.x, row.y
            )));
        }
        let (xs, ys) = lines.entry(row.line).or_default();
        xs.push(row.x);
        ys.push(row.y);
    }

    let mut series = Vec::new();
    for (name, (x, y)) in lines {
        let category: LineCategory = name.parse()?;
        if !category.is_loadable() {
            continue;
        }
        series.push(SampleSeries {
            name,
            category,
            x,
            y,
        });
    }
    Ok(series)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).trim(csv::Trim::All);
    builder
}

/// Read sample series from a `line,x,y` CSV file, grouped by line in name order.
pub fn read_series_csv(path: impl AsRef<Path>) -> Result<Vec<SampleSeries>, PlannerError> {
    let mut rdr = reader_builder().from_path(path.as_ref())?;
    parse_csv_records(&mut rdr)
}

/// Read sample series from `line,x,y` CSV bytes.
pub fn read_series_csv_from_bytes(data: &[u8]) -> Result<Vec<SampleSeries>, PlannerError> {
    let mut rdr = reader_builder().from_reader(data);
    parse_csv_records(&mut rdr)
}

/// Write sample series as `line,x,y` rows.
pub fn write_series_csv(series: &[SampleSeries], path: impl AsRef<Path>) -> Result<(), PlannerError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for s in series {
        for (&x, &y) in s.x.iter().zip(&s.y) {
            wtr.serialize(SampleRow {
                line: s.name.clone(),
                x,
                y,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write planned thinnings, one row per event.
pub fn write_events_csv(events: &[ThinningEvent], path: impl AsRef<Path>) -> Result<(), PlannerError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for event in events {
        wtr.serialize(EventRow {
            age: event.x,
            value_before: event.value_before,
            value_after: event.value_after,
            removed: event.removed(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the density polyline, one row per point.
pub fn write_track_csv(track: &ThinningTrack, path: impl AsRef<Path>) -> Result<(), PlannerError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for (age, value) in track.points() {
        wtr.serialize(TrackRow { age, value })?;
    }
    wtr.flush()?;
    Ok(())
}
