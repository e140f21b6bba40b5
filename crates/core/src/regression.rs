//! Ordinary least-squares linear regression over [`FeatureRow`]s.
//!
//! The fit centres every column, solves the normal equations
//! `(XᵀX) β = Xᵀy` by Gauss-Jordan elimination and recovers the intercept
//! from the means. A column with no remaining variance after elimination
//! (constant, or a linear combination of earlier columns) gets a zero
//! coefficient instead of failing the fit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::features::{FeatureRow, FEATURE_COLUMNS};

const N_FEATURES: usize = FEATURE_COLUMNS.len();

/// Relative pivot size below which a column is treated as dependent.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// A fitted linear model: `y = intercept + Σ coefficients[i] · x[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: [f64; N_FEATURES],
    pub feature_names: Vec<String>,
}

impl LinearModel {
    /// Fit a model to `rows` / `targets`.
    pub fn fit(rows: &[FeatureRow], targets: &[f64]) -> Result<Self, CoreError> {
        if rows.is_empty() {
            return Err(CoreError::Validation(
                "cannot fit a model without samples".to_string(),
            ));
        }
        if rows.len() != targets.len() {
            return Err(CoreError::Validation(format!(
                "feature rows ({}) and targets ({}) differ in length",
                rows.len(),
                targets.len()
            )));
        }

        let n = rows.len() as f64;
        let xs: Vec<[f64; N_FEATURES]> = rows.iter().map(FeatureRow::to_array).collect();

        let mut x_mean = [0.0; N_FEATURES];
        for x in &xs {
            for (m, v) in x_mean.iter_mut().zip(x) {
                *m += v / n;
            }
        }
        let y_mean = targets.iter().sum::<f64>() / n;

        let mut xtx = [[0.0; N_FEATURES]; N_FEATURES];
        let mut xty = [0.0; N_FEATURES];
        for (x, y) in xs.iter().zip(targets) {
            let xc: [f64; N_FEATURES] = std::array::from_fn(|j| x[j] - x_mean[j]);
            let yc = y - y_mean;
            for i in 0..N_FEATURES {
                xty[i] += xc[i] * yc;
                for j in 0..N_FEATURES {
                    xtx[i][j] += xc[i] * xc[j];
                }
            }
        }

        let coefficients = solve_symmetric(xtx, xty);
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(b, m)| b * m)
                .sum::<f64>();

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(CoreError::Internal(
                "linear fit produced non-finite coefficients".to_string(),
            ));
        }

        Ok(Self {
            intercept,
            coefficients,
            feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn predict(&self, row: &FeatureRow) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.to_array())
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }

    pub fn predict_many(&self, rows: &[FeatureRow]) -> Vec<f64> {
        rows.iter().map(|r| self.predict(r)).collect()
    }

    /// Coefficient per feature name.
    pub fn feature_importance(&self) -> BTreeMap<String, f64> {
        self.feature_names
            .iter()
            .cloned()
            .zip(self.coefficients)
            .collect()
    }
}

/// Solve `a · x = b` for a symmetric positive semi-definite `a`.
///
/// Gauss-Jordan on diagonal pivots; a pivot that has collapsed relative to
/// its original diagonal marks the column as dependent and pins its
/// coefficient to zero.
fn solve_symmetric(
    mut a: [[f64; N_FEATURES]; N_FEATURES],
    mut b: [f64; N_FEATURES],
) -> [f64; N_FEATURES] {
    let original_diag: [f64; N_FEATURES] = std::array::from_fn(|i| a[i][i]);
    let mut active = [true; N_FEATURES];

    for k in 0..N_FEATURES {
        let pivot = a[k][k];
        if original_diag[k] <= f64::MIN_POSITIVE || pivot <= PIVOT_TOLERANCE * original_diag[k] {
            active[k] = false;
            for i in 0..N_FEATURES {
                a[i][k] = 0.0;
                a[k][i] = 0.0;
            }
            b[k] = 0.0;
            continue;
        }

        for j in 0..N_FEATURES {
            a[k][j] /= pivot;
        }
        b[k] /= pivot;

        for i in 0..N_FEATURES {
            if i == k {
                continue;
            }
            let factor = a[i][k];
            if factor == 0.0 {
                continue;
            }
            for j in 0..N_FEATURES {
                a[i][j] -= factor * a[k][j];
            }
            b[i] -= factor * b[k];
        }
    }

    std::array::from_fn(|k| if active[k] { b[k] } else { 0.0 })
}
