//! Template matching by least-squares extrapolation over prototype distances.
//!
//! No coefficient map between the two spaces is fitted. Each item is
//! described by its Euclidean distances to the training prototypes in the
//! source space, and a least-squares fit learns how those distances map to
//! the prototypes' target vectors. Held-out items are then predicted from
//! their own distance profile.

use crate::linalg::{lstsq, pairwise_euclidean};
use crate::{NeurosemError, Result};
use ndarray::{concatenate, s, Array2, ArrayView2, Axis};

/// Output of a template-matching prediction.
#[derive(Clone, Debug)]
pub struct TemplatePrediction {
    /// Predicted target vectors for the test items, `num_test × target_dim`
    pub predicted: Array2<f64>,
    /// The fit applied back to the prototypes, `num_proto × target_dim`
    pub reconstructed_prototypes: Array2<f64>,
    /// Rank of the prototype distance block
    pub rank: usize,
}

/// Predict targets for `test_scores` from prototypes.
///
/// `prototype_targets` and `prototype_scores` describe the same training
/// items (rows aligned); `test_scores` lives in the same space as
/// `prototype_scores`. Swapping which matrices play the scores and targets
/// roles gives the two prediction directions.
pub fn botastic_predict<'a>(
    prototype_targets: ArrayView2<'_, f64>,
    prototype_scores: ArrayView2<'a, f64>,
    test_scores: ArrayView2<'a, f64>,
) -> Result<TemplatePrediction> {
    let num_proto = prototype_scores.nrows();
    if num_proto == 0 {
        return Err(NeurosemError::insufficient("template matching needs at least one prototype"));
    }
    if prototype_targets.nrows() != num_proto {
        return Err(NeurosemError::shape(
            "template prototype rows",
            vec![num_proto],
            vec![prototype_targets.nrows()],
        ));
    }
    if test_scores.ncols() != prototype_scores.ncols() {
        return Err(NeurosemError::shape(
            "template test score columns",
            vec![prototype_scores.ncols()],
            vec![test_scores.ncols()],
        ));
    }

    let stacked = concatenate(Axis(0), &[prototype_scores, test_scores])
        .map_err(|e| NeurosemError::Internal { message: e.to_string() })?;
    let dists = pairwise_euclidean(stacked.view());
    let to_prototypes = dists.slice(s![.., ..num_proto]);

    let weights = lstsq(to_prototypes.slice(s![..num_proto, ..]), prototype_targets)?;
    let extrapolated = to_prototypes.dot(&weights.solution);

    Ok(TemplatePrediction {
        predicted: extrapolated.slice(s![num_proto.., ..]).to_owned(),
        reconstructed_prototypes: extrapolated.slice(s![..num_proto, ..]).to_owned(),
        rank: weights.rank,
    })
}
