mod csv_io;
mod digitizer;
mod model_store;

use std::path::Path;

use tracing::info;

use crate::error::PlannerError;
use crate::models::{BulkReport, CurveModelRegistry, LineCategory, StandMetadata};

pub use csv_io::{
    read_series_csv, read_series_csv_from_bytes, write_events_csv, write_series_csv,
    write_track_csv,
};
pub use digitizer::{read_digitizer, read_digitizer_from_bytes};
pub use model_store::{load_chart_file, JsonModelStore, ModelStore};

/// One digitized line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    pub name: String,
    pub category: LineCategory,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Trait for reading training series from a file.
pub trait SeriesReader {
    fn read(&self, path: &Path) -> Result<Vec<SampleSeries>, PlannerError>;
}

/// Plot digitizer project (JSON) reader.
pub struct DigitizerFormat;

impl SeriesReader for DigitizerFormat {
    fn read(&self, path: &Path) -> Result<Vec<SampleSeries>, PlannerError> {
        read_digitizer(path)
    }
}

/// `line,x,y` CSV reader.
pub struct CsvFormat;

impl SeriesReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<Vec<SampleSeries>, PlannerError> {
        read_series_csv(path)
    }
}

/// Read training series, picking the format from the file extension.
pub fn read_series(path: &Path) -> Result<Vec<SampleSeries>, PlannerError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let reader: &dyn SeriesReader = match ext.as_str() {
        "json" => &DigitizerFormat,
        "csv" => &CsvFormat,
        other => {
            return Err(PlannerError::InvalidArgument(format!(
                "unsupported series format '{other}', expected json or csv"
            )))
        }
    };
    reader.read(path)
}

/// Append `series` to the registry and widen the stand bounds to cover them.
///
/// Models missing from the registry are created with `degree`.
pub fn load_training_set(
    series: &[SampleSeries],
    stand: &mut StandMetadata,
    registry: &mut CurveModelRegistry,
    degree: u32,
) -> Result<(), PlannerError> {
    for s in series {
        registry
            .model_or_insert(s.category, degree)
            .append_samples(&s.x, &s.y, None)
            .map_err(|e| PlannerError::InvalidArgument(format!("line '{}': {e}", s.name)))?;
        stand.extend_bounds(s.category, &s.x, &s.y);
    }
    Ok(())
}

/// Load, fit and release training data in one go.
///
/// Returns the fitted registry together with the fit report; categories that
/// failed to fit stay in the registry unfitted.
pub fn prepare_models(
    series: &[SampleSeries],
    stand: &mut StandMetadata,
    degree: u32,
) -> Result<(CurveModelRegistry, BulkReport), PlannerError> {
    let mut registry = CurveModelRegistry::new();
    load_training_set(series, stand, &mut registry, degree)?;
    let report = registry.fit_all();
    registry.clear_all_training_data();
    info!(
        stand = %stand.name,
        fitted = report.succeeded.len(),
        failed = report.failed.len(),
        "prepared curve models"
    );
    Ok((registry, report))
}
