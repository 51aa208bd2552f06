use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Kind of reference curve drawn on a stand chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineCategory {
    MinLogging,
    MaxLogging,
    EconomicMax,
    EconomicMin,
    StandardGrowth,
    /// Growth from stand origin; the start parameter is the initial density.
    Growth,
    /// Growth after a cut; the start parameter is the age of that cut.
    Recovery,
}

impl LineCategory {
    pub const COUNT: usize = 7;

    pub const ALL: [LineCategory; LineCategory::COUNT] = [
        LineCategory::MinLogging,
        LineCategory::MaxLogging,
        LineCategory::EconomicMax,
        LineCategory::EconomicMin,
        LineCategory::StandardGrowth,
        LineCategory::Growth,
        LineCategory::Recovery,
    ];

    /// Slot of this category in fixed-size per-category tables.
    pub const fn index(self) -> usize {
        match self {
            LineCategory::MinLogging => 0,
            LineCategory::MaxLogging => 1,
            LineCategory::EconomicMax => 2,
            LineCategory::EconomicMin => 3,
            LineCategory::StandardGrowth => 4,
            LineCategory::Growth => 5,
            LineCategory::Recovery => 6,
        }
    }

    /// Whether predictions for this category take a non-zero start parameter.
    pub const fn accepts_start_parameter(self) -> bool {
        match self {
            LineCategory::Growth | LineCategory::Recovery => true,
            LineCategory::MinLogging
            | LineCategory::MaxLogging
            | LineCategory::EconomicMax
            | LineCategory::EconomicMin
            | LineCategory::StandardGrowth => false,
        }
    }

    /// Start parameter implied by the first point of a digitized series:
    /// the initial density for Growth, the cut age for Recovery, 0 otherwise.
    pub fn default_start_parameter(self, first_x: f64, first_y: f64) -> f64 {
        match self {
            LineCategory::Growth => first_y,
            LineCategory::Recovery => first_x,
            _ => 0.0,
        }
    }

    /// Categories read from digitized charts; the rest are ignored on load.
    pub const fn is_loadable(self) -> bool {
        matches!(
            self,
            LineCategory::MinLogging
                | LineCategory::MaxLogging
                | LineCategory::EconomicMin
                | LineCategory::Growth
                | LineCategory::Recovery
        )
    }

    /// Chart label of this category.
    pub const fn label(self) -> &'static str {
        match self {
            LineCategory::MinLogging => "min level logging",
            LineCategory::MaxLogging => "max level logging",
            LineCategory::EconomicMax => "economic max line",
            LineCategory::EconomicMin => "economic min line",
            LineCategory::StandardGrowth => "standard growth line",
            LineCategory::Growth => "growth line",
            LineCategory::Recovery => "recovery line",
        }
    }
}

impl std::fmt::Display for LineCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LineCategory {
    type Err = PlannerError;

    /// Parse a chart label. Numbered series such as `"growth line 3"` map to
    /// their family.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        if let Some(rest) = label.strip_prefix("growth line ") {
            if is_series_number(rest) {
                return Ok(LineCategory::Growth);
            }
        }
        if let Some(rest) = label.strip_prefix("recovery line ") {
            if is_series_number(rest) {
                return Ok(LineCategory::Recovery);
            }
        }
        LineCategory::ALL
            .into_iter()
            .find(|c| c.label() == label)
            .ok_or_else(|| PlannerError::ParseError(format!("Unidentified line type: '{s}'")))
    }
}

fn is_series_number(rest: &str) -> bool {
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}
