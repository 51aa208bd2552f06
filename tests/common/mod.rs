#![allow(dead_code)]

use stand_thinning_planner::{
    io::{prepare_models, SampleSeries},
    models::{CurveModelRegistry, LineCategory, StandMetadata},
    EngineSettings,
};

pub const TOLERANCE: f64 = 1e-6;

#[path = "../../src/simulation/synthetic_chart.rs"]
mod synthetic_chart;

/// Digitized lines of a synthetic chart: constant bound lines, linear growth
/// `s + 0.007x` and linear recovery from 0.2 at `recovery_rate` per year.
pub fn chart_series(recovery_rate: f64) -> Vec<SampleSeries> {
    synthetic_chart::chart_lines(recovery_rate)
        .into_iter()
        .map(|(name, x, y)| SampleSeries {
            category: name.parse().unwrap(),
            name,
            x,
            y,
        })
        .collect()
}

pub fn settings() -> EngineSettings {
    EngineSettings {
        degree: 2,
        ..EngineSettings::default()
    }
}

/// Fitted chart with thinning allowed until 100 (60 in a protective forest).
pub fn fitted_chart(recovery_rate: f64) -> (StandMetadata, CurveModelRegistry) {
    let mut stand = StandMetadata::new("synthetic_pine", 100.0, 60.0);
    let (registry, report) = prepare_models(&chart_series(recovery_rate), &mut stand, 2).unwrap();
    assert!(report.is_complete(), "{:?}", report.failed);
    (stand, registry)
}

/// Digitizer project JSON for the synthetic chart.
pub fn digitizer_json(recovery_rate: f64) -> String {
    let datasets: Vec<serde_json::Value> = chart_series(recovery_rate)
        .into_iter()
        .map(|s| {
            let data: Vec<serde_json::Value> = s
                .x
                .iter()
                .zip(&s.y)
                .map(|(x, y)| serde_json::json!({ "x": 0, "y": 0, "value": [x, y] }))
                .collect();
            serde_json::json!({ "name": s.name, "data": data })
        })
        .collect();
    serde_json::json!({ "version": [4, 2], "datasetColl": datasets }).to_string()
}

pub fn assert_category(series: &SampleSeries, category: LineCategory) {
    assert_eq!(series.category, category, "line '{}'", series.name);
}
