use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::warn;

use crate::error::PlannerError;
use crate::io::SampleSeries;
use crate::models::{CurveModelRegistry, LineCategory};

/// Residuals smaller than this never count as a change of side.
pub const INFLECTION_THRESHOLD: f64 = 0.1;

/// Point where the data crosses to the other side of the fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inflection {
    pub x: f64,
    /// Observed minus predicted
    pub difference: f64,
}

/// Agreement between one test series and its fitted curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesFit {
    pub name: String,
    pub category: LineCategory,
    pub points: usize,
    pub mse: f64,
    pub r2: f64,
    pub inflections: Vec<Inflection>,
    pub max_error: f64,
}

/// Fit quality of a registry over a whole test set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub series: Vec<SeriesFit>,
    /// Series whose category has no model
    pub skipped: Vec<String>,
    pub max_error: f64,
}

fn r2_score(observed: &[f64], predicted: &[f64]) -> f64 {
    let mean = observed.iter().mean();
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(o, p)| (o - p).powi(2))
        .sum();
    let ss_tot: f64 = observed.iter().map(|o| (o - mean).powi(2)).sum();
    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Changes of side of the residual whose magnitude exceeds [`INFLECTION_THRESHOLD`].
/// The first large residual counts as a change.
fn inflections(xs: &[f64], differences: &[f64]) -> Vec<Inflection> {
    let mut side = 0.0_f64;
    let mut out = Vec::new();
    for (&x, &difference) in xs.iter().zip(differences) {
        if difference.abs() <= INFLECTION_THRESHOLD {
            continue;
        }
        let current = difference.signum();
        if current != side {
            side = current;
            out.push(Inflection { x, difference });
        }
    }
    out
}

fn check_series(
    registry: &CurveModelRegistry,
    series: &SampleSeries,
) -> Result<SeriesFit, PlannerError> {
    if series.x.is_empty() || series.x.len() != series.y.len() {
        return Err(PlannerError::InvalidArgument(format!(
            "test line '{}' has {} x and {} y values",
            series.name,
            series.x.len(),
            series.y.len()
        )));
    }
    let start = series
        .category
        .default_start_parameter(series.x[0], series.y[0]);
    let predicted = registry.predict_many(series.category, &series.x, start)?;
    let differences: Vec<f64> = series
        .y
        .iter()
        .zip(&predicted)
        .map(|(o, p)| o - p)
        .collect();

    Ok(SeriesFit {
        name: series.name.clone(),
        category: series.category,
        points: series.x.len(),
        mse: differences.iter().map(|d| d * d).mean(),
        r2: r2_score(&series.y, &predicted),
        inflections: inflections(&series.x, &differences),
        max_error: differences.iter().fold(0.0, |acc: f64, d| acc.max(d.abs())),
    })
}

/// Compare fitted curves against held-out test series.
///
/// Each series is predicted with the start parameter implied by its first
/// point. Series of categories without a model are skipped.
pub fn check_fit(
    registry: &CurveModelRegistry,
    test_data: &[SampleSeries],
) -> Result<FitReport, PlannerError> {
    if test_data.is_empty() {
        return Err(PlannerError::InvalidArgument(
            "test data is missing".to_string(),
        ));
    }

    let mut series = Vec::new();
    let mut skipped = Vec::new();
    for test in test_data {
        if !registry.contains(test.category) {
            warn!(name = %test.name, category = %test.category, "no model for test line");
            skipped.push(test.name.clone());
            continue;
        }
        series.push(check_series(registry, test)?);
    }

    let max_error = series.iter().fold(0.0, |acc: f64, s| acc.max(s.max_error));
    Ok(FitReport {
        series,
        skipped,
        max_error,
    })
}
