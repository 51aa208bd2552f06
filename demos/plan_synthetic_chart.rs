//! Planning example: fit a small synthetic chart and edit its thinning plan.
//!
//! Run from the project root:
//!   cargo run --example plan_synthetic_chart

use stand_thinning_planner::io::{prepare_models, SampleSeries};
use stand_thinning_planner::models::StandMetadata;
use stand_thinning_planner::simulation::{BearingSource, SimulationEngine};
use stand_thinning_planner::visualization::{print_events_table, print_thinning_chart};
use stand_thinning_planner::EngineSettings;

fn series(name: &str, xs: &[f64], f: impl Fn(f64) -> f64) -> SampleSeries {
    SampleSeries {
        name: name.to_string(),
        category: name.parse().expect("known line name"),
        x: xs.to_vec(),
        y: xs.iter().map(|&x| f(x)).collect(),
    }
}

fn main() {
    let ages: Vec<f64> = (0..=20).map(|i| i as f64 * 5.0).collect();
    let mut chart = vec![
        series("min level logging", &ages, |x| 0.2 + 0.001 * x),
        series("max level logging", &ages, |x| 0.8 + 0.002 * x),
        series("economic min line", &ages[2..], |_| 0.5),
    ];
    for k in 1..=8 {
        let s = k as f64 * 0.1;
        chart.push(series(&format!("growth line {k}"), &ages, move |x| {
            s + 0.009 * x - 0.00002 * x * x
        }));
    }
    for k in 0..10 {
        let cut = k as f64 * 10.0;
        let after: Vec<f64> = ages.iter().copied().filter(|&x| x >= cut).collect();
        chart.push(series(&format!("recovery line {k}"), &after, move |x| {
            0.2 + 0.018 * (x - cut)
        }));
    }

    let mut stand = StandMetadata::new("demo_pine", 90.0, 60.0);
    let settings = EngineSettings {
        degree: 3,
        ..EngineSettings::default()
    };
    let (registry, report) =
        prepare_models(&chart, &mut stand, settings.degree).expect("Failed to fit chart");
    println!("Fitted {} curve models", report.succeeded.len());

    let mut engine = SimulationEngine::new(&registry, stand, settings);
    match engine.plan(BearingSource::Point { x: 30.0, y: 0.55 }) {
        Ok(events) => print_events_table(events),
        Err(e) => {
            eprintln!("Planning failed: {e}");
            return;
        }
    }

    // Push the first cut deeper and see how the rest of the plan moves.
    if let Some(first) = engine.timeline().ok().and_then(|t| t.first().copied()) {
        if let Err(e) = engine.correct_thinning(first.x, first.value_after - 0.05) {
            eprintln!("Correction failed: {e}");
        }
    }
    if let Ok(events) = engine.timeline() {
        print_events_table(events);
        print_thinning_chart(events);
    }
}
