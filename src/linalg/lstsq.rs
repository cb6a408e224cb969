//! Minimum-norm least squares through a singular value decomposition.
//!
//! Matrices live in `ndarray` everywhere else in the crate; the solve
//! bridges into `nalgebra` for the decomposition and straight back.

use crate::{NeurosemError, Result};
use nalgebra::{DMatrix, SVD};
use ndarray::{Array1, Array2, ArrayView2};

/// Upper bound on implicit-shift sweeps before the SVD is declared non-convergent.
const MAX_SVD_ITERATIONS: usize = 10_000;

/// Solution of `a · x ≈ b`.
#[derive(Clone, Debug)]
pub struct LstsqSolution {
    /// Minimizer of `‖a·x − b‖²` with the smallest norm, `a.ncols() × b.ncols()`
    pub solution: Array2<f64>,
    /// Effective rank of `a` under the cutoff
    pub rank: usize,
    /// Singular values of `a`, descending
    pub singular_values: Array1<f64>,
}

impl LstsqSolution {
    /// Whether `a` had full column rank.
    pub fn is_full_rank(&self) -> bool {
        self.rank == self.solution.nrows()
    }
}

/// Solve `a · x ≈ b` in the least-squares sense.
///
/// Singular values below `eps · max(m, n) · s_max` are discarded, so
/// rank-deficient or ill-conditioned systems get the best-effort
/// minimum-norm solution rather than an error. Non-finite input, a
/// decomposition that does not converge, or non-finite output is a
/// [`NeurosemError::NumericalFit`].
pub fn lstsq(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> Result<LstsqSolution> {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return Err(NeurosemError::insufficient(format!(
            "least squares needs a non-empty design matrix, got {m}x{n}"
        )));
    }
    if b.nrows() != m {
        return Err(NeurosemError::shape(
            "least-squares target rows",
            vec![m, b.ncols()],
            vec![b.nrows(), b.ncols()],
        ));
    }
    if !a.iter().chain(b.iter()).all(|v| v.is_finite()) {
        return Err(NeurosemError::numerical(
            "least squares",
            "design or target matrix contains NaN or infinite values",
        ));
    }

    let svd = SVD::try_new(to_dmatrix(a), true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
        .ok_or_else(|| {
            NeurosemError::numerical(
                "least squares",
                format!("SVD of {m}x{n} design matrix did not converge"),
            )
        })?;

    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = f64::EPSILON * m.max(n) as f64 * s_max;
    let rank = svd.singular_values.iter().filter(|&&s| s > cutoff).count();

    let x = svd
        .solve(&to_dmatrix(b), cutoff)
        .map_err(|msg| NeurosemError::numerical("least squares", msg))?;

    let solution = from_dmatrix(&x);
    if !solution.iter().all(|v| v.is_finite()) {
        return Err(NeurosemError::numerical(
            "least squares",
            "solution contains NaN or infinite values",
        ));
    }

    Ok(LstsqSolution {
        solution,
        rank,
        singular_values: svd.singular_values.iter().copied().collect(),
    })
}

fn to_dmatrix(array: ArrayView2<'_, f64>) -> DMatrix<f64> {
    let (rows, cols) = array.dim();
    DMatrix::from_fn(rows, cols, |i, j| array[[i, j]])
}

fn from_dmatrix(mat: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((mat.nrows(), mat.ncols()), |(i, j)| mat[(i, j)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_square_system_is_solved_exactly() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![[3.0], [5.0]];
        let sol = lstsq(a.view(), b.view()).unwrap();

        assert_eq!(sol.rank, 2);
        assert!(sol.is_full_rank());
        assert_abs_diff_eq!(sol.solution[[0, 0]], 0.8, epsilon = 1e-10);
        assert_abs_diff_eq!(sol.solution[[1, 0]], 1.4, epsilon = 1e-10);
    }

    #[test]
    fn test_overdetermined_matches_normal_equations() {
        // y = 2x fit through noisy points
        let a = array![[1.0], [2.0], [3.0]];
        let b = array![[2.1], [3.9], [6.0]];
        let sol = lstsq(a.view(), b.view()).unwrap();

        let expected = (1.0 * 2.1 + 2.0 * 3.9 + 3.0 * 6.0) / 14.0;
        assert_abs_diff_eq!(sol.solution[[0, 0]], expected, epsilon = 1e-10);
    }

    #[test]
    fn test_rank_deficient_returns_minimum_norm() {
        // duplicated column: any split of the weight fits, minimum norm splits evenly
        let a = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let b = array![[2.0], [4.0], [6.0]];
        let sol = lstsq(a.view(), b.view()).unwrap();

        assert_eq!(sol.rank, 1);
        assert!(!sol.is_full_rank());
        assert_abs_diff_eq!(sol.solution[[0, 0]], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(sol.solution[[1, 0]], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_underdetermined_wide_system() {
        let a = array![[1.0, 1.0]];
        let b = array![[2.0]];
        let sol = lstsq(a.view(), b.view()).unwrap();
        assert_abs_diff_eq!(sol.solution[[0, 0]], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(sol.solution[[1, 0]], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_matrix_gives_zero_solution() {
        let a = Array2::<f64>::zeros((3, 2));
        let b = array![[1.0], [2.0], [3.0]];
        let sol = lstsq(a.view(), b.view()).unwrap();
        assert_eq!(sol.rank, 0);
        assert!(sol.solution.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_multiple_targets() {
        let a = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let b = array![[1.0, 2.0], [3.0, 4.0], [4.0, 6.0]];
        let sol = lstsq(a.view(), b.view()).unwrap();
        assert_eq!(sol.solution.dim(), (2, 2));
        assert_abs_diff_eq!(sol.solution[[0, 0]], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(sol.solution[[1, 1]], 4.0, epsilon = 1e-10);
    }

    #[test]
    fn test_non_finite_input_is_numerical_error() {
        let a = array![[1.0, f64::NAN], [0.0, 1.0]];
        let b = array![[1.0], [1.0]];
        let err = lstsq(a.view(), b.view()).unwrap_err();
        assert!(err.is_fold_recoverable());
    }

    #[test]
    fn test_row_mismatch_is_shape_error() {
        let a = array![[1.0], [2.0]];
        let b = array![[1.0], [2.0], [3.0]];
        assert!(lstsq(a.view(), b.view()).unwrap_err().is_shape_mismatch());
    }
}
