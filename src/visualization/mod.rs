mod tables;
mod charts;

pub use tables::{
    format_stand_summary, print_stand_summary,
    format_events_table, print_events_table,
    format_base_lines_table, print_base_lines_table,
    format_fit_report, print_fit_report,
};
pub use charts::{format_thinning_chart, print_thinning_chart};
