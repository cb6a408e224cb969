//! Ordinary least-squares encoding model from feature space to response space.

use crate::linalg::lstsq;
use crate::{NeurosemError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// A fitted linear map `responses ≈ features · coefficientsᵀ (+ intercept)`.
///
/// Coefficients are stored `channels × features`, one row per response
/// channel. The same matrix doubles as the mind-reading decoder:
/// `responses · coefficients` lands in feature space.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodingModel {
    coefficients: Array2<f64>,
    intercept: Option<Array1<f64>>,
}

impl EncodingModel {
    /// Fit without an intercept; inputs are expected to be centered already.
    pub fn fit(features: ArrayView2<'_, f64>, responses: ArrayView2<'_, f64>) -> Result<Self> {
        check_rows(features, responses)?;
        let solved = lstsq(features, responses)?;
        Ok(Self {
            coefficients: solved.solution.reversed_axes(),
            intercept: None,
        })
    }

    /// Fit with an intercept by centering both sides before the solve.
    pub fn fit_with_intercept(
        features: ArrayView2<'_, f64>,
        responses: ArrayView2<'_, f64>,
    ) -> Result<Self> {
        check_rows(features, responses)?;
        let feature_mean = column_mean(features)?;
        let response_mean = column_mean(responses)?;

        let centered_x = &features - &feature_mean;
        let centered_y = &responses - &response_mean;
        let solved = lstsq(centered_x.view(), centered_y.view())?;

        let coefficients = solved.solution.reversed_axes();
        let intercept = &response_mean - &coefficients.dot(&feature_mean);

        Ok(Self {
            coefficients,
            intercept: Some(intercept),
        })
    }

    /// Predict responses from features.
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.num_features() {
            return Err(NeurosemError::shape(
                "encoding model input features",
                vec![self.num_features()],
                vec![features.ncols()],
            ));
        }
        let predicted = features.dot(&self.coefficients.t());
        Ok(match &self.intercept {
            Some(intercept) => predicted + intercept,
            None => predicted,
        })
    }

    /// Map responses back into feature space with the forward coefficients.
    pub fn decode(&self, responses: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if responses.ncols() != self.num_channels() {
            return Err(NeurosemError::shape(
                "decoder input channels",
                vec![self.num_channels()],
                vec![responses.ncols()],
            ));
        }
        Ok(responses.dot(&self.coefficients))
    }

    /// Coefficient of determination on `(features, responses)`, averaged uniformly over channels.
    pub fn score(
        &self,
        features: ArrayView2<'_, f64>,
        responses: ArrayView2<'_, f64>,
    ) -> Result<f64> {
        let predicted = self.predict(features)?;
        r2_score(responses, predicted.view())
    }

    /// `channels × features` coefficient matrix.
    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    /// Per-channel intercept, if fitted with one.
    pub fn intercept(&self) -> Option<&Array1<f64>> {
        self.intercept.as_ref()
    }

    /// Consume the model, keeping only its coefficients.
    pub fn into_coefficients(self) -> Array2<f64> {
        self.coefficients
    }

    pub fn num_features(&self) -> usize {
        self.coefficients.ncols()
    }

    pub fn num_channels(&self) -> usize {
        self.coefficients.nrows()
    }
}

/// Uniform average over columns of `1 - SS_res / SS_tot`.
///
/// A constant target column scores 1 when predicted exactly and 0 otherwise.
pub fn r2_score(actual: ArrayView2<'_, f64>, predicted: ArrayView2<'_, f64>) -> Result<f64> {
    if actual.dim() != predicted.dim() {
        let (ar, ac) = actual.dim();
        let (pr, pc) = predicted.dim();
        return Err(NeurosemError::shape("r2 inputs", vec![ar, ac], vec![pr, pc]));
    }
    if actual.nrows() == 0 || actual.ncols() == 0 {
        return Err(NeurosemError::insufficient("r2 needs at least one row and column"));
    }

    let total: f64 = actual
        .columns()
        .into_iter()
        .zip(predicted.columns())
        .map(|(y, y_hat)| {
            let mean = y.sum() / y.len() as f64;
            let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
            let ss_res: f64 = y.iter().zip(y_hat.iter()).map(|(a, p)| (a - p).powi(2)).sum();
            if ss_tot == 0.0 {
                if ss_res == 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                1.0 - ss_res / ss_tot
            }
        })
        .sum();

    Ok(total / actual.ncols() as f64)
}

fn check_rows(features: ArrayView2<'_, f64>, responses: ArrayView2<'_, f64>) -> Result<()> {
    if features.nrows() != responses.nrows() {
        return Err(NeurosemError::shape(
            "encoding model training rows",
            vec![features.nrows()],
            vec![responses.nrows()],
        ));
    }
    Ok(())
}

fn column_mean(data: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
    data.mean_axis(Axis(0))
        .ok_or_else(|| NeurosemError::insufficient("cannot fit an encoding model on zero rows"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn linear_data() -> (Array2<f64>, Array2<f64>) {
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, -1.0], [-1.0, 3.0]];
        // channel 0 = 2*f0 - f1, channel 1 = 0.5*f1, channel 2 = f0 + f1
        let w = array![[2.0, 0.0, 1.0], [-1.0, 0.5, 1.0]];
        let y = x.dot(&w);
        (x, y)
    }

    #[test]
    fn test_fit_recovers_exact_linear_map() {
        let (x, y) = linear_data();
        let model = EncodingModel::fit(x.view(), y.view()).unwrap();

        assert_eq!(model.coefficients().dim(), (3, 2));
        assert_abs_diff_eq!(model.coefficients()[[0, 0]], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(model.coefficients()[[0, 1]], -1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(model.coefficients()[[1, 1]], 0.5, epsilon = 1e-10);
        assert!(model.intercept().is_none());

        let r2 = model.score(x.view(), y.view()).unwrap();
        assert_abs_diff_eq!(r2, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_predict_and_decode_shapes() {
        let (x, y) = linear_data();
        let model = EncodingModel::fit(x.view(), y.view()).unwrap();

        let predicted = model.predict(x.view()).unwrap();
        assert_eq!(predicted.dim(), y.dim());

        let decoded = model.decode(y.view()).unwrap();
        assert_eq!(decoded.dim(), x.dim());
        let expected = y.dot(model.coefficients());
        for (d, e) in decoded.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*d, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_predict_rejects_wrong_feature_count() {
        let (x, y) = linear_data();
        let model = EncodingModel::fit(x.view(), y.view()).unwrap();
        let err = model.predict(array![[1.0, 2.0, 3.0]].view()).unwrap_err();
        assert!(err.is_shape_mismatch());
        assert!(model.decode(array![[1.0]].view()).is_err());
    }

    #[test]
    fn test_intercept_fit_recovers_offset() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = x.mapv(|v| 3.0 * v + 5.0);
        let model = EncodingModel::fit_with_intercept(x.view(), y.view()).unwrap();

        assert_abs_diff_eq!(model.coefficients()[[0, 0]], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(model.intercept().unwrap()[0], 5.0, epsilon = 1e-10);

        let predicted = model.predict(array![[10.0]].view()).unwrap();
        assert_abs_diff_eq!(predicted[[0, 0]], 35.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intercept_fit_on_constant_feature_predicts_mean() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]];
        let model = EncodingModel::fit_with_intercept(x.view(), y.view()).unwrap();

        assert_abs_diff_eq!(model.coefficients()[[0, 0]], 0.0, epsilon = 1e-12);
        let predicted = model.predict(array![[7.0]].view()).unwrap();
        assert_abs_diff_eq!(predicted[[0, 0]], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(predicted[[0, 1]], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_constant_column_convention() {
        let actual = array![[1.0, 2.0], [1.0, 4.0]];
        let exact = actual.clone();
        assert_abs_diff_eq!(r2_score(actual.view(), exact.view()).unwrap(), 1.0);

        let off = array![[0.0, 2.0], [1.0, 4.0]];
        // constant column mispredicted scores 0, other column perfect
        assert_abs_diff_eq!(r2_score(actual.view(), off.view()).unwrap(), 0.5);
    }

    #[test]
    fn test_r2_mean_prediction_is_zero() {
        let actual = array![[1.0], [2.0], [3.0]];
        let mean = array![[2.0], [2.0], [2.0]];
        assert_abs_diff_eq!(r2_score(actual.view(), mean.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_row_mismatch_is_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![[1.0]];
        assert!(EncodingModel::fit(x.view(), y.view()).unwrap_err().is_shape_mismatch());
    }
}
