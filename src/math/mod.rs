//! Numerical helpers: least squares, polynomial features and sampling grids.

mod grid;
mod ols;
mod polynomial;

pub use grid::{arange, enforce_non_decreasing};
pub use ols::solve_least_squares;
pub use polynomial::{monomial_exponents, PolynomialFeatures};
