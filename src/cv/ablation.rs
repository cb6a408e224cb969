//! Per-feature ablation: one single-column encoding model per feature.

use super::fold::{Fold, FoldContext};
use super::result::{record_trial, FeatureAblationResult};
use crate::eval::{score_pair, Method, Task, Variant};
use crate::linalg::Dissimilarity;
use crate::model::EncodingModel;
use crate::Result;
use ndarray::s;
use rayon::prelude::*;

const ABLATION_VARIANT: Variant = Variant::new(Task::BrainPrediction, Method::EncodingModel);

/// Fit and score every feature column of `fold` on its own.
///
/// Rows come out feature by feature, individual scoring before combo.
pub fn ablate_features(
    fold: &Fold,
    context: &FoldContext,
    feature_names: &[String],
    dissimilarity: Dissimilarity,
    parallel: bool,
) -> Result<Vec<FeatureAblationResult>> {
    let per_feature = |feat_num: usize| {
        ablate_feature(fold, context, feat_num, &feature_names[feat_num], dissimilarity)
    };

    let nested: Vec<Vec<FeatureAblationResult>> = if parallel {
        (0..feature_names.len())
            .into_par_iter()
            .map(per_feature)
            .collect::<Result<_>>()?
    } else {
        (0..feature_names.len())
            .map(per_feature)
            .collect::<Result<_>>()?
    };

    Ok(nested.into_iter().flatten().collect())
}

fn ablate_feature(
    fold: &Fold,
    context: &FoldContext,
    feat_num: usize,
    feat_name: &str,
    dissimilarity: Dissimilarity,
) -> Result<Vec<FeatureAblationResult>> {
    let train_x = fold.train_x.slice(s![.., feat_num..=feat_num]);
    let test_x = fold.test_x.slice(s![.., feat_num..=feat_num]);

    let model = EncodingModel::fit_with_intercept(train_x, fold.train_y.view())?;
    let r2 = model.score(train_x, fold.train_y.view())?;
    let predicted = model.predict(test_x)?;
    let scores = score_pair(fold.test_y.view(), predicted.view(), dissimilarity)?;

    Ok(scores
        .iter()
        .map(|score| FeatureAblationResult {
            feat_num,
            feat_name: feat_name.to_string(),
            trial: record_trial(context, ABLATION_VARIANT, r2, score),
        })
        .collect())
}
