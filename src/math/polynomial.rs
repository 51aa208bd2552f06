//! Polynomial feature expansion of the two model inputs `(x, s)`.

use serde::{Deserialize, Serialize};

/// Exponent pairs `(i, j)` of every monomial `x^i s^j` with `i + j <= degree`.
///
/// Ordered by total degree, then by descending power of `x`:
/// `1, x, s, x², xs, s², …`.
pub fn monomial_exponents(degree: u32) -> Vec<(u32, u32)> {
    let mut exponents = Vec::new();
    for total in 0..=degree {
        for i in (0..=total).rev() {
            exponents.push((i, total - i));
        }
    }
    exponents
}

/// Scaled polynomial expansion.
///
/// Inputs are divided by fixed scales before expansion so that high powers of
/// ages around 100 stay well conditioned. The scales are part of the fitted
/// model and must be reused for prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialFeatures {
    pub degree: u32,
    pub x_scale: f64,
    pub s_scale: f64,
}

impl PolynomialFeatures {
    /// Pick scales from the largest magnitude seen in each input.
    pub fn for_samples(degree: u32, x: &[f64], s: &[f64]) -> Self {
        Self {
            degree,
            x_scale: scale_of(x),
            s_scale: scale_of(s),
        }
    }

    pub fn len(&self) -> usize {
        let d = self.degree as usize;
        (d + 1) * (d + 2) / 2
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Expand one `(x, s)` pair into `out`, which must hold `self.len()` values.
    pub fn expand_into(&self, x: f64, s: f64, out: &mut [f64]) {
        let xs = x / self.x_scale;
        let ss = s / self.s_scale;
        let mut k = 0;
        for total in 0..=self.degree {
            for i in (0..=total).rev() {
                out[k] = xs.powi(i as i32) * ss.powi((total - i) as i32);
                k += 1;
            }
        }
    }

    pub fn expand(&self, x: f64, s: f64) -> Vec<f64> {
        let mut row = vec![0.0; self.len()];
        self.expand_into(x, s, &mut row);
        row
    }
}

fn scale_of(values: &[f64]) -> f64 {
    let max = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if max > f64::EPSILON && max.is_finite() {
        max
    } else {
        1.0
    }
}
