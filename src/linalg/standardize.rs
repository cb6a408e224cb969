//! Column-wise z-scoring fit on one partition and applied to another.

use crate::{NeurosemError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Spreads at or below this are treated as zero.
const ZERO_SPREAD: f64 = 1e-12;

/// Per-column z-score transform.
///
/// Fit learns each column's mean and standard deviation; transform applies
/// those learned parameters to any matrix with the same column count. A
/// column with zero spread keeps scale 1, so it maps to exactly 0 rather
/// than NaN.
#[derive(Clone, Debug, PartialEq)]
pub struct Standardizer {
    mean: Array1<f64>,
    scale: Array1<f64>,
    flat_columns: usize,
}

impl Standardizer {
    /// Fit with population standard deviation (ddof = 0).
    pub fn fit(data: ArrayView2<'_, f64>) -> Result<Self> {
        Self::fit_with_ddof(data, 0)
    }

    /// Fit with `ddof` degrees of freedom subtracted from the row count.
    pub fn fit_with_ddof(data: ArrayView2<'_, f64>, ddof: usize) -> Result<Self> {
        let rows = data.nrows();
        if rows <= ddof {
            return Err(NeurosemError::insufficient(format!(
                "standardizing needs more than {ddof} rows, got {rows}"
            )));
        }

        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| NeurosemError::insufficient("cannot standardize an empty matrix"))?;
        let spread = data.std_axis(Axis(0), ddof as f64);
        let flat_columns = spread.iter().filter(|&&s| s.is_nan() || s <= ZERO_SPREAD).count();
        let scale = spread.mapv(|s| if s > ZERO_SPREAD { s } else { 1.0 });

        Ok(Self {
            mean,
            scale,
            flat_columns,
        })
    }

    /// Fit on `data` and return the standardized copy.
    pub fn fit_transform(data: ArrayView2<'_, f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(data)?;
        let transformed = scaler.transform(data)?;
        Ok((scaler, transformed))
    }

    /// Apply the fitted parameters without refitting.
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.mean.len() {
            return Err(NeurosemError::shape(
                "standardizer columns",
                vec![self.mean.len()],
                vec![data.ncols()],
            ));
        }
        Ok((&data - &self.mean) / &self.scale)
    }

    /// Fitted column means.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Fitted column scales (1 for zero-spread columns).
    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Columns whose spread fell at or below the zero threshold.
    pub fn flat_columns(&self) -> usize {
        self.flat_columns
    }
}
