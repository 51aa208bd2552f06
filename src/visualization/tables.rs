use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::FitReport;
use crate::models::{BaseLines, StandMetadata, ThinningEvent};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Format a stand summary table as a string.
pub fn format_stand_summary(stand: &StandMetadata) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Stand Summary".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = new_table(vec!["Property", "Value"]);
    table.add_row(vec![Cell::new("Name"), Cell::new(&stand.name)]);
    for (label, code) in [
        ("Area code", &stand.area_code),
        ("Breed code", &stand.breed_code),
        ("Condition code", &stand.condition_code),
    ] {
        if let Some(code) = code {
            table.add_row(vec![Cell::new(label), Cell::new(code)]);
        }
    }
    table.add_row(vec![
        Cell::new("Age range"),
        Cell::new(format!("{} - {}", optional(stand.x_min), optional(stand.x_max))),
    ]);
    table.add_row(vec![
        Cell::new("Density range"),
        Cell::new(format!("{} - {}", optional(stand.y_min), optional(stand.y_max))),
    ]);
    table.add_row(vec![
        Cell::new("Economic from age"),
        Cell::new(optional(stand.x_min_economic)),
    ]);
    table.add_row(vec![
        Cell::new("Thinning age limit"),
        Cell::new(format!("{:.1}", stand.age_thinning)),
    ]);
    table.add_row(vec![
        Cell::new("Protective age limit"),
        Cell::new(format!("{:.1}", stand.age_thinning_save)),
    ]);
    table.add_row(vec![
        Cell::new("Protective forest"),
        Cell::new(if stand.protective { "yes" } else { "no" }),
    ]);

    output.push_str(&format!("{table}"));
    output
}

/// Print a formatted stand summary table.
pub fn print_stand_summary(stand: &StandMetadata) {
    print!("{}", format_stand_summary(stand));
}

/// Format the planned thinnings. The last row closes the horizon.
pub fn format_events_table(events: &[ThinningEvent]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Thinning Plan".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = new_table(vec!["#", "Age", "Before", "After", "Removed"]);
    let last = events.len().saturating_sub(1);
    for (i, event) in events.iter().enumerate() {
        if i == last {
            table.add_row(vec![
                Cell::new("end"),
                Cell::new(format!("{:.1}", event.x)),
                Cell::new(format!("{:.3}", event.value_before)),
                Cell::new("-"),
                Cell::new("-"),
            ]);
        } else {
            table.add_row(vec![
                Cell::new(format!("{}", i + 1)),
                Cell::new(format!("{:.1}", event.x)),
                Cell::new(format!("{:.3}", event.value_before)),
                Cell::new(format!("{:.3}", event.value_after)),
                Cell::new(format!("{:.3}", event.removed())),
            ]);
        }
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the planned thinnings.
pub fn print_events_table(events: &[ThinningEvent]) {
    print!("{}", format_events_table(events));
}

/// Format the base lines (and the bearing line when given) at every
/// `stride`-th grid age, always including the last one.
pub fn format_base_lines_table(lines: &BaseLines, bearing: Option<&[f64]>, stride: usize) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Base Lines".bold().green()));
    output.push_str(&format!(
        "{}\n",
        format!("{} grid points", lines.len()).dimmed()
    ));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut header = vec!["Age", "Min logging", "Max logging", "Economic min"];
    if bearing.is_some() {
        header.push("Bearing");
    }
    let mut table = new_table(header);

    let stride = stride.max(1);
    let last = lines.len().saturating_sub(1);
    for i in (0..lines.len()).filter(|&i| i % stride == 0 || i == last) {
        let mut row = vec![
            Cell::new(format!("{:.1}", lines.grid[i])),
            Cell::new(format!("{:.3}", lines.min_logging[i])),
            Cell::new(format!("{:.3}", lines.max_logging[i])),
            Cell::new(format!("{:.3}", lines.economic_min[i])),
        ];
        if let Some(value) = bearing.and_then(|b| b.get(i)) {
            row.push(Cell::new(format!("{value:.3}")));
        }
        table.add_row(row);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the base lines table.
pub fn print_base_lines_table(lines: &BaseLines, bearing: Option<&[f64]>, stride: usize) {
    print!("{}", format_base_lines_table(lines, bearing, stride));
}

/// Format a fit quality report as a string.
pub fn format_fit_report(report: &FitReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Fit Quality".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut table = new_table(vec!["Line", "Points", "MSE", "R2", "Inflections", "Max error"]);
    for fit in &report.series {
        table.add_row(vec![
            Cell::new(&fit.name),
            Cell::new(format!("{}", fit.points)),
            Cell::new(format!("{:.6}", fit.mse)),
            Cell::new(format!("{:.4}", fit.r2)),
            Cell::new(format!("{}", fit.inflections.len())),
            Cell::new(format!("{:.4}", fit.max_error)),
        ]);
    }
    output.push_str(&format!("{table}\n"));

    for name in &report.skipped {
        output.push_str(&format!("{}\n", format!("skipped '{name}': no model").yellow()));
    }
    output.push_str(&format!("Maximum approximation error: {:.4}\n", report.max_error));
    output
}

/// Print a fit quality report.
pub fn print_fit_report(report: &FitReport) {
    print!("{}", format_fit_report(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SeriesFit;
    use crate::models::LineCategory;

    fn sample_stand() -> StandMetadata {
        let mut stand = StandMetadata::new("pine_sorrel", 80.0, 100.0);
        stand.update_codes(Some("NT"), None, None).unwrap();
        stand.extend_bounds(LineCategory::EconomicMin, &[20.0, 120.0], &[0.5, 0.6]);
        stand
    }

    fn sample_lines() -> BaseLines {
        let grid: Vec<f64> = (0..=10).map(|i| i as f64 * 10.0).collect();
        BaseLines {
            min_logging: vec![0.2; grid.len()],
            max_logging: vec![0.8; grid.len()],
            economic_min: vec![0.5; grid.len()],
            grid,
        }
    }

    #[test]
    fn test_format_stand_summary_contains_fields() {
        let output = format_stand_summary(&sample_stand());
        assert!(output.contains("pine_sorrel"));
        assert!(output.contains("Area code"));
        assert!(!output.contains("Breed code"));
        assert!(output.contains("20.00"));
        assert!(output.contains("Protective forest"));
    }

    #[test]
    fn test_format_events_table() {
        let events = vec![
            ThinningEvent::new(43.0, 0.501, 0.2),
            ThinningEvent::new(100.0, 0.87, 1e-12),
        ];
        let output = format_events_table(&events);
        assert!(output.contains("Thinning Plan"));
        assert!(output.contains("43.0"));
        assert!(output.contains("0.301"));
        assert!(output.contains("end"));
    }

    #[test]
    fn test_format_events_table_empty() {
        let output = format_events_table(&[]);
        assert!(output.contains("Thinning Plan"));
    }

    #[test]
    fn test_format_base_lines_stride_keeps_last_row() {
        let lines = sample_lines();
        let bearing = vec![0.5; lines.len()];
        let output = format_base_lines_table(&lines, Some(&bearing), 3);
        assert!(output.contains("Bearing"));
        assert!(output.contains("30.0"));
        assert!(!output.contains("40.0"));
        assert!(output.contains("100.0"));
    }

    #[test]
    fn test_format_fit_report() {
        let report = FitReport {
            series: vec![SeriesFit {
                name: "growth line 1".to_string(),
                category: LineCategory::Growth,
                points: 12,
                mse: 0.0004,
                r2: 0.9871,
                inflections: vec![],
                max_error: 0.05,
            }],
            skipped: vec!["recovery line 1".to_string()],
            max_error: 0.05,
        };
        let output = format_fit_report(&report);
        assert!(output.contains("growth line 1"));
        assert!(output.contains("0.9871"));
        assert!(output.contains("recovery line 1"));
        assert!(output.contains("Maximum approximation error: 0.0500"));
    }
}
