use tracing::{debug, warn};

use super::{CurveModel, LineCategory};
use crate::error::PlannerError;

/// One fitted curve model per line category.
///
/// Stored as a fixed table indexed by [`LineCategory::index`].
#[derive(Debug, Clone, Default)]
pub struct CurveModelRegistry {
    models: [Option<CurveModel>; LineCategory::COUNT],
}

/// Categories whose fit or clear step failed during a bulk operation.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub succeeded: Vec<LineCategory>,
    pub failed: Vec<(LineCategory, String)>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl CurveModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `model` under `category`, replacing any previous model.
    pub fn add_model(&mut self, category: LineCategory, model: CurveModel) {
        self.models[category.index()] = Some(model);
    }

    pub fn contains(&self, category: LineCategory) -> bool {
        self.models[category.index()].is_some()
    }

    pub fn get_model(&self, category: LineCategory) -> Result<&CurveModel, PlannerError> {
        self.models[category.index()]
            .as_ref()
            .ok_or_else(|| PlannerError::NotFound(format!("no model for {category}")))
    }

    /// Model for `category`, created empty with `degree` if it does not exist yet.
    pub fn model_or_insert(&mut self, category: LineCategory, degree: u32) -> &mut CurveModel {
        self.models[category.index()].get_or_insert_with(|| CurveModel::new(category, degree))
    }

    /// Registered models in category order.
    pub fn models(&self) -> impl Iterator<Item = &CurveModel> {
        self.models.iter().flatten()
    }

    pub fn categories(&self) -> Vec<LineCategory> {
        self.models().map(|m| m.category()).collect()
    }

    /// Fit every registered model.
    ///
    /// A failing category is logged and reported but does not stop the others;
    /// a model left unfit fails later when asked to predict.
    pub fn fit_all(&mut self) -> BulkReport {
        let mut report = BulkReport::default();
        for model in self.models.iter_mut().flatten() {
            let category = model.category();
            match model.fit() {
                Ok(()) => {
                    debug!(%category, samples = model.sample_count(), "fitted curve model");
                    report.succeeded.push(category);
                }
                Err(e) => {
                    warn!(%category, error = %e, "failed to fit curve model");
                    report.failed.push((category, e.to_string()));
                }
            }
        }
        report
    }

    /// Drop the training samples of every registered model.
    pub fn clear_all_training_data(&mut self) -> BulkReport {
        let mut report = BulkReport::default();
        for model in self.models.iter_mut().flatten() {
            model.clear();
            report.succeeded.push(model.category());
        }
        report
    }

    fn check_start_parameter(category: LineCategory, s: f64) -> Result<(), PlannerError> {
        if s != 0.0 && !category.accepts_start_parameter() {
            return Err(PlannerError::InvalidArgument(format!(
                "start parameter {s} is not allowed for {category}"
            )));
        }
        Ok(())
    }

    pub fn predict(&self, category: LineCategory, x: f64, s: f64) -> Result<f64, PlannerError> {
        let model = self.get_model(category)?;
        Self::check_start_parameter(category, s)?;
        model.predict(x, s)
    }

    pub fn predict_many(
        &self,
        category: LineCategory,
        xs: &[f64],
        s: f64,
    ) -> Result<Vec<f64>, PlannerError> {
        let model = self.get_model(category)?;
        Self::check_start_parameter(category, s)?;
        model.predict_many(xs, s)
    }

    pub fn predict_range(
        &self,
        category: LineCategory,
        x_start: f64,
        x_end: f64,
        step: f64,
        s: f64,
    ) -> Result<(Vec<f64>, Vec<f64>), PlannerError> {
        if x_start >= x_end {
            return Err(PlannerError::InvalidArgument(format!(
                "invalid range: start {x_start} >= end {x_end}"
            )));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(PlannerError::InvalidArgument(format!(
                "step must be positive, got {step}"
            )));
        }
        let model = self.get_model(category)?;
        Self::check_start_parameter(category, s)?;
        model.predict_range(x_start, x_end, step, s)
    }
}
