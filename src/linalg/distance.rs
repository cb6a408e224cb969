//! Dissimilarity measures between response or feature vectors.

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Pearson correlation distance, `1 - r`, in `[0, 2]`.
///
/// Returns NaN when the vectors differ in length, have fewer than two
/// elements, or either has zero variance: the correlation is undefined
/// there and every comparison against NaN is false.
pub fn pearson_dist(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let n = a.len();
    if n != b.len() || n < 2 {
        return f64::NAN;
    }

    let mean_a = a.sum() / n as f64;
    let mean_b = b.sum() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }

    let r = cov / (var_a.sqrt() * var_b.sqrt());
    (1.0 - r).clamp(0.0, 2.0)
}

/// Euclidean distance; NaN on length mismatch.
pub fn euclidean_dist(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    if a.len() != b.len() {
        return f64::NAN;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Symmetric matrix of Euclidean distances between the rows of `data`.
pub fn pairwise_euclidean(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let n = data.nrows();
    let mut dists = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean_dist(data.row(i), data.row(j));
            dists[[i, j]] = d;
            dists[[j, i]] = d;
        }
    }
    dists
}

/// Dissimilarity used by the forced-choice scorer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dissimilarity {
    /// `1 - pearson r`
    #[default]
    Pearson,
    /// L2 distance
    Euclidean,
}

impl Dissimilarity {
    /// Distance between two vectors; lower means more alike.
    pub fn compute(self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Pearson => pearson_dist(a, b),
            Self::Euclidean => euclidean_dist(a, b),
        }
    }

    /// Name as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Euclidean => "euclidean",
        }
    }
}
