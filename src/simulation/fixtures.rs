//! Simulation test fixtures built on the synthetic chart.

use crate::config::EngineSettings;
use crate::models::{CurveModelRegistry, LineCategory, StandMetadata};

use super::synthetic_chart::chart_lines;

fn all_series(recovery_rate: f64) -> Vec<(LineCategory, Vec<f64>, Vec<f64>)> {
    chart_lines(recovery_rate)
        .into_iter()
        .map(|(name, xs, ys)| (name.parse().unwrap(), xs, ys))
        .collect()
}

pub(crate) fn fixture_settings() -> EngineSettings {
    EngineSettings {
        degree: 2,
        ..EngineSettings::default()
    }
}

pub(crate) fn fixture_stand() -> StandMetadata {
    let mut stand = StandMetadata::new("fixture", 100.0, 60.0);
    for (category, xs, ys) in all_series(0.02) {
        stand.extend_bounds(category, &xs, &ys);
    }
    stand
}

/// Registry fitted to the chart, skipping the lines in `without`.
pub(crate) fn fitted_registry_without(
    recovery_rate: f64,
    without: &[LineCategory],
) -> CurveModelRegistry {
    let mut registry = CurveModelRegistry::new();
    for (category, xs, ys) in all_series(recovery_rate) {
        if without.contains(&category) {
            continue;
        }
        registry
            .model_or_insert(category, 2)
            .append_samples(&xs, &ys, None)
            .unwrap();
    }
    let report = registry.fit_all();
    assert!(report.is_complete(), "{:?}", report.failed);
    registry
}

pub(crate) fn fitted_registry(recovery_rate: f64) -> CurveModelRegistry {
    fitted_registry_without(recovery_rate, &[])
}
