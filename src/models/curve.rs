use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::LineCategory;
use crate::error::PlannerError;
use crate::math::{arange, solve_least_squares, PolynomialFeatures};

/// Coefficients of a fitted surface together with the feature expansion they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedSurface {
    pub features: PolynomialFeatures,
    pub coefficients: Vec<f64>,
}

impl FittedSurface {
    pub fn evaluate(&self, x: f64, s: f64) -> f64 {
        let row = self.features.expand(x, s);
        row.iter()
            .zip(&self.coefficients)
            .map(|(f, c)| f * c)
            .sum()
    }
}

/// Polynomial regression surface `y = f(x, s)` for one line category.
///
/// Training samples accumulate through [`CurveModel::append_samples`] and are
/// fitted in one pass; [`CurveModel::clear`] drops them afterwards without
/// touching the fitted coefficients.
#[derive(Debug, Clone)]
pub struct CurveModel {
    category: LineCategory,
    degree: u32,
    x: Vec<f64>,
    y: Vec<f64>,
    s: Vec<f64>,
    surface: Option<FittedSurface>,
}

impl CurveModel {
    pub fn new(category: LineCategory, degree: u32) -> Self {
        Self {
            category,
            degree,
            x: Vec::new(),
            y: Vec::new(),
            s: Vec::new(),
            surface: None,
        }
    }

    /// Rebuild an already fitted model, e.g. from a model store.
    pub fn from_surface(
        category: LineCategory,
        surface: FittedSurface,
    ) -> Result<Self, PlannerError> {
        if surface.coefficients.len() != surface.features.len() {
            return Err(PlannerError::InvalidArgument(format!(
                "{category}: expected {} coefficients for degree {}, got {}",
                surface.features.len(),
                surface.features.degree,
                surface.coefficients.len()
            )));
        }
        Ok(Self {
            category,
            degree: surface.features.degree,
            x: Vec::new(),
            y: Vec::new(),
            s: Vec::new(),
            surface: Some(surface),
        })
    }

    pub fn category(&self) -> LineCategory {
        self.category
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn sample_count(&self) -> usize {
        self.x.len()
    }

    pub fn is_fitted(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&FittedSurface> {
        self.surface.as_ref()
    }

    /// Append a digitized series.
    ///
    /// Without an explicit start parameter, Growth series use their first
    /// density, Recovery series their first age, and all other categories 0.
    pub fn append_samples(
        &mut self,
        x: &[f64],
        y: &[f64],
        start_parameter: Option<f64>,
    ) -> Result<(), PlannerError> {
        if x.len() != y.len() {
            return Err(PlannerError::InvalidArgument(format!(
                "{}: got {} x values and {} y values",
                self.category,
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(PlannerError::InvalidArgument(format!(
                "{}: empty sample series",
                self.category
            )));
        }

        let start = match (start_parameter, self.category) {
            (Some(s), c) if c.accepts_start_parameter() || s == 0.0 => s,
            (Some(s), c) => {
                return Err(PlannerError::InvalidArgument(format!(
                    "start parameter {s} is not allowed for {c}"
                )))
            }
            (None, c) => c.default_start_parameter(x[0], y[0]),
        };

        self.x.extend_from_slice(x);
        self.y.extend_from_slice(y);
        self.s.extend(std::iter::repeat(start).take(x.len()));
        Ok(())
    }

    /// Fit the polynomial surface to every sample appended so far.
    pub fn fit(&mut self) -> Result<(), PlannerError> {
        if self.x.is_empty() || self.y.is_empty() {
            return Err(PlannerError::InvalidState(format!(
                "{}: no training samples to fit",
                self.category
            )));
        }
        if self.x.len() != self.y.len() || self.x.len() != self.s.len() {
            return Err(PlannerError::InvalidState(format!(
                "{}: training arrays are misaligned",
                self.category
            )));
        }

        let features = PolynomialFeatures::for_samples(self.degree, &self.x, &self.s);
        let rows = self.x.len();
        let cols = features.len();

        let mut design = DMatrix::<f64>::zeros(rows, cols);
        let mut row = vec![0.0; cols];
        for i in 0..rows {
            features.expand_into(self.x[i], self.s[i], &mut row);
            for (j, value) in row.iter().enumerate() {
                design[(i, j)] = *value;
            }
        }
        let target = DVector::from_column_slice(&self.y);

        let beta = solve_least_squares(&design, &target).ok_or_else(|| {
            PlannerError::Numerical(format!(
                "{}: least squares did not converge on {rows} samples",
                self.category
            ))
        })?;

        self.surface = Some(FittedSurface {
            features,
            coefficients: beta.iter().copied().collect(),
        });
        Ok(())
    }

    fn fitted(&self) -> Result<&FittedSurface, PlannerError> {
        self.surface.as_ref().ok_or_else(|| {
            PlannerError::InvalidState(format!("{}: model is not fitted", self.category))
        })
    }

    pub fn predict(&self, x: f64, s: f64) -> Result<f64, PlannerError> {
        Ok(self.fitted()?.evaluate(x, s))
    }

    pub fn predict_many(&self, xs: &[f64], s: f64) -> Result<Vec<f64>, PlannerError> {
        let surface = self.fitted()?;
        Ok(xs.iter().map(|&x| surface.evaluate(x, s)).collect())
    }

    /// Predict over `x_start, x_start + step, …` for every point below `x_end + step`.
    ///
    /// When `x_end - x_start` is not a multiple of `step` the last sample lies past `x_end`.
    pub fn predict_range(
        &self,
        x_start: f64,
        x_end: f64,
        step: f64,
        s: f64,
    ) -> Result<(Vec<f64>, Vec<f64>), PlannerError> {
        let surface = self.fitted()?;
        let xs = arange(x_start, x_end + step, step);
        let ys = xs.iter().map(|&x| surface.evaluate(x, s)).collect();
        Ok((xs, ys))
    }

    /// Drop all training samples. Fitted coefficients are kept.
    pub fn clear(&mut self) {
        self.x = Vec::new();
        self.y = Vec::new();
        self.s = Vec::new();
    }
}
