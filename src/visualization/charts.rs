use colored::Colorize;

use crate::models::ThinningEvent;

/// Format a text bar chart of the planned cuts: the kept density in green,
/// the removed part in red.
pub fn format_thinning_chart(events: &[ThinningEvent]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Thinning Intensity".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    // The terminal event is not a cut.
    let cuts = &events[..events.len().saturating_sub(1)];
    if cuts.is_empty() {
        output.push_str("  No thinnings planned.\n");
        return output;
    }

    let max_value = cuts.iter().map(|e| e.value_before).fold(0.0f64, f64::max);
    let bar_width = 40;
    let scale = |v: f64| -> usize {
        if max_value > 0.0 {
            ((v.max(0.0) / max_value) * bar_width as f64).round() as usize
        } else {
            0
        }
    };

    output.push_str(&format!(
        "  {:>8}  {:>8}  {:>8}  Density\n",
        "Age", "Before", "After"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(70)));

    for event in cuts {
        let kept = scale(event.value_after);
        let removed = scale(event.value_before).saturating_sub(kept);
        output.push_str(&format!(
            "  {:>8.1}  {:>8.3}  {:>8.3}  {}{}\n",
            event.x,
            event.value_before,
            event.value_after,
            "\u{2588}".repeat(kept).green(),
            "\u{2591}".repeat(removed).red()
        ));
    }

    output.push('\n');
    output
}

/// Print a text bar chart of the planned cuts.
pub fn print_thinning_chart(events: &[ThinningEvent]) {
    print!("{}", format_thinning_chart(events));
}
