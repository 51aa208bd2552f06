use serde::{Deserialize, Serialize};

use super::LineCategory;
use crate::error::PlannerError;

/// Identity, domain bounds and age thresholds of the stand being planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandMetadata {
    /// Chart name, also the key of the stored model
    pub name: String,
    pub area_code: Option<String>,
    pub breed_code: Option<String>,
    pub condition_code: Option<String>,
    /// Last age at which thinning is allowed
    pub age_thinning: f64,
    /// Last age at which thinning is allowed in a protective forest
    pub age_thinning_save: f64,
    /// Protective forest mode
    #[serde(default)]
    pub protective: bool,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    /// Age below which economic constraints are suppressed
    pub x_min_economic: Option<f64>,
}

impl StandMetadata {
    pub fn new(name: impl Into<String>, age_thinning: f64, age_thinning_save: f64) -> Self {
        Self {
            name: name.into(),
            area_code: None,
            breed_code: None,
            condition_code: None,
            age_thinning,
            age_thinning_save,
            protective: false,
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            x_min_economic: None,
        }
    }

    /// Set reference codes; `None` leaves a code unchanged, an empty string is rejected.
    pub fn update_codes(
        &mut self,
        area_code: Option<&str>,
        breed_code: Option<&str>,
        condition_code: Option<&str>,
    ) -> Result<(), PlannerError> {
        for (label, value) in [
            ("area", area_code),
            ("breed", breed_code),
            ("condition", condition_code),
        ] {
            if value.is_some_and(|v| v.trim().is_empty()) {
                return Err(PlannerError::InvalidArgument(format!(
                    "{label} code must be a non-empty string"
                )));
            }
        }
        if let Some(code) = area_code {
            self.area_code = Some(code.to_string());
        }
        if let Some(code) = breed_code {
            self.breed_code = Some(code.to_string());
        }
        if let Some(code) = condition_code {
            self.condition_code = Some(code.to_string());
        }
        Ok(())
    }

    pub fn set_protective(&mut self, protective: bool) {
        self.protective = protective;
    }

    /// Age limit for thinning under the current protective mode.
    pub fn cutting_limit(&self) -> f64 {
        if self.protective {
            self.age_thinning_save
        } else {
            self.age_thinning
        }
    }

    /// Age range of the chart.
    pub fn x_bounds(&self) -> Result<(f64, f64), PlannerError> {
        match (self.x_min, self.x_max) {
            (Some(min), Some(max)) => Ok((min, max)),
            _ => Err(PlannerError::InvalidState(format!(
                "stand '{}' has no age bounds; load sample data first",
                self.name
            ))),
        }
    }

    /// Age from which economic constraints apply; falls back to `x_min`.
    pub fn economic_threshold(&self) -> Result<f64, PlannerError> {
        match self.x_min_economic {
            Some(x) => Ok(x),
            None => Ok(self.x_bounds()?.0),
        }
    }

    /// `(x_min, x_max, y_min, y_max)` for plotting.
    pub fn min_max(&self) -> Result<(f64, f64, f64, f64), PlannerError> {
        let (Some(x_min), Some(x_max), Some(y_min), Some(y_max)) =
            (self.x_min, self.x_max, self.y_min, self.y_max)
        else {
            return Err(PlannerError::InvalidState(
                "stand bounds (x_min, x_max, y_min, y_max) are not fully initialized".to_string(),
            ));
        };
        if x_min > x_max || y_min > y_max {
            return Err(PlannerError::InvalidState(
                "invalid bounds: x_min must be <= x_max and y_min <= y_max".to_string(),
            ));
        }
        Ok((x_min, x_max, y_min, y_max))
    }

    /// Grow the bounds to cover a loaded sample series.
    ///
    /// EconomicMin series also lower `x_min_economic` to their smallest age.
    pub fn extend_bounds(&mut self, category: LineCategory, xs: &[f64], ys: &[f64]) {
        fn lower(current: Option<f64>, values: &[f64]) -> Option<f64> {
            values.iter().copied().fold(current, |acc, v| match acc {
                Some(a) => Some(a.min(v)),
                None => Some(v),
            })
        }
        fn upper(current: Option<f64>, values: &[f64]) -> Option<f64> {
            values.iter().copied().fold(current, |acc, v| match acc {
                Some(a) => Some(a.max(v)),
                None => Some(v),
            })
        }

        self.x_min = lower(self.x_min, xs);
        self.x_max = upper(self.x_max, xs);
        self.y_min = lower(self.y_min, ys);
        self.y_max = upper(self.y_max, ys);
        if category == LineCategory::EconomicMin {
            self.x_min_economic = lower(self.x_min_economic, xs);
        }
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.name.trim().is_empty() {
            return Err(PlannerError::InvalidArgument(
                "stand name must not be empty".to_string(),
            ));
        }
        if !(self.age_thinning.is_finite() && self.age_thinning > 0.0) {
            return Err(PlannerError::InvalidArgument(format!(
                "thinning age must be positive, got {}",
                self.age_thinning
            )));
        }
        if !(self.age_thinning_save.is_finite() && self.age_thinning_save > 0.0) {
            return Err(PlannerError::InvalidArgument(format!(
                "protective thinning age must be positive, got {}",
                self.age_thinning_save
            )));
        }
        if let (Some(min), Some(max)) = (self.x_min, self.x_max) {
            if min >= max {
                return Err(PlannerError::InvalidArgument(format!(
                    "age range is empty: x_min {min} >= x_max {max}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutting_limit_follows_protective_flag() {
        let mut stand = StandMetadata::new("pine_sorrel", 80.0, 100.0);
        assert_eq!(stand.cutting_limit(), 80.0);
        stand.set_protective(true);
        assert_eq!(stand.cutting_limit(), 100.0);
    }

    #[test]
    fn test_extend_bounds_union() {
        let mut stand = StandMetadata::new("s", 80.0, 100.0);
        stand.extend_bounds(LineCategory::Growth, &[5.0, 60.0], &[0.3, 0.9]);
        stand.extend_bounds(LineCategory::MinLogging, &[0.0, 100.0], &[0.2, 0.4]);
        assert_eq!(stand.min_max().unwrap(), (0.0, 100.0, 0.2, 0.9));
        assert_eq!(stand.x_min_economic, None);
    }

    #[test]
    fn test_extend_bounds_sets_economic_threshold() {
        let mut stand = StandMetadata::new("s", 80.0, 100.0);
        stand.extend_bounds(LineCategory::EconomicMin, &[25.0, 90.0], &[0.5, 0.6]);
        stand.extend_bounds(LineCategory::EconomicMin, &[20.0, 30.0], &[0.5, 0.6]);
        assert_eq!(stand.x_min_economic, Some(20.0));
        assert_eq!(stand.economic_threshold().unwrap(), 20.0);
    }

    #[test]
    fn test_economic_threshold_falls_back_to_x_min() {
        let mut stand = StandMetadata::new("s", 80.0, 100.0);
        stand.extend_bounds(LineCategory::MinLogging, &[10.0, 100.0], &[0.2, 0.2]);
        assert_eq!(stand.economic_threshold().unwrap(), 10.0);
    }

    #[test]
    fn test_missing_bounds_is_invalid_state() {
        let stand = StandMetadata::new("s", 80.0, 100.0);
        assert!(matches!(stand.x_bounds(), Err(PlannerError::InvalidState(_))));
        assert!(stand.min_max().is_err());
    }

    #[test]
    fn test_update_codes() {
        let mut stand = StandMetadata::new("s", 80.0, 100.0);
        stand.update_codes(Some("NT"), None, Some("SOR")).unwrap();
        assert_eq!(stand.area_code.as_deref(), Some("NT"));
        assert_eq!(stand.breed_code, None);
        assert!(stand.update_codes(None, Some(""), None).is_err());
    }

    #[test]
    fn test_validate() {
        let mut stand = StandMetadata::new("s", 80.0, 100.0);
        assert!(stand.validate().is_ok());
        stand.age_thinning = 0.0;
        assert!(stand.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut stand = StandMetadata::new("pine_sorrel", 80.0, 100.0);
        stand.extend_bounds(LineCategory::EconomicMin, &[20.0, 90.0], &[0.5, 0.6]);
        let json = serde_json::to_string(&stand).unwrap();
        let back: StandMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stand);
    }
}
