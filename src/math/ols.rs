//! Ordinary least squares via SVD.
//!
//! Curve categories without a start parameter carry an all-zero `s` column, so
//! every monomial containing `s` is identically zero and the design matrix is
//! rank deficient. SVD with a singular-value cutoff returns the minimum-norm
//! solution in that case instead of failing.

use nalgebra::{DMatrix, DVector};

/// Solve `min ||X β - y||²` using SVD.
///
/// Returns `None` if no tolerance produces a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // y = 2 + 3x on x = [0, 1, 2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_tolerates_zero_column() {
        // Second column is all zeros: minimum-norm solution leaves it at 0.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let y = DVector::from_row_slice(&[0.4, 0.4, 0.4]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 0.4).abs() < 1e-10);
        assert!(beta[1].abs() < 1e-10);
    }
}
