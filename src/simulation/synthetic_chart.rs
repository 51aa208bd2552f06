//! Digitized lines of the synthetic chart used across the test suites.
//!
//! Bound lines are constant (0.2 / 0.8 / 0.5 from age 10), Growth is
//! `s + 0.007x` and Recovery rises linearly from 0.2 at the cut age.
//! Only std is used here so integration tests can include the file directly.

/// Chart line label with its sampled ages and densities.
pub type ChartLine = (String, Vec<f64>, Vec<f64>);

fn ages(from: f64) -> Vec<f64> {
    (0..=20)
        .map(|i| i as f64 * 5.0)
        .filter(|&x| x >= from)
        .collect()
}

fn line(name: &str, xs: Vec<f64>, f: impl Fn(f64) -> f64) -> ChartLine {
    let ys = xs.iter().map(|&x| f(x)).collect();
    (name.to_string(), xs, ys)
}

/// All lines of the chart, Recovery rising by `recovery_rate` per year.
pub fn chart_lines(recovery_rate: f64) -> Vec<ChartLine> {
    let mut lines = vec![
        line("min level logging", ages(0.0), |_| 0.2),
        line("max level logging", ages(0.0), |_| 0.8),
        line("economic min line", ages(10.0), |_| 0.5),
    ];
    for k in 1..=8 {
        let s = k as f64 * 0.1;
        lines.push(line(&format!("growth line {k}"), ages(0.0), move |x| s + 0.007 * x));
    }
    for k in 0..10 {
        let start = k as f64 * 10.0;
        lines.push(line(&format!("recovery line {k}"), ages(start), move |x| {
            0.2 + recovery_rate * (x - start)
        }));
    }
    lines
}
