//! Cross-validation driver: every held-out pair, four variants, two rules.

use super::ablation::ablate_features;
use super::fold::{Fold, FoldContext};
use super::pairs::{ItemPair, LeaveTwoOut};
use super::result::{
    record_trial, AnalysisOutput, FoldCoefficients, FoldFailure, FoldOutcome, TrialResult,
};
use crate::config::AnalysisConfig;
use crate::data::AnalysisDataset;
use crate::eval::{score_pair, ScoringRule, Variant};
use crate::linalg::Dissimilarity;
use crate::model::EncodingModel;
use crate::{NeurosemError, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Progress observer, called with `(completed, total)` folds.
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Shared flag checked before each fold starts.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Driver knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CvOptions {
    pub dissimilarity: Dissimilarity,
    pub test_individual_features: bool,
    pub parallel: bool,
    /// Folds between progress callbacks
    pub progress_interval: usize,
}

impl Default for CvOptions {
    fn default() -> Self {
        Self {
            dissimilarity: Dissimilarity::Pearson,
            test_individual_features: false,
            parallel: false,
            progress_interval: 100,
        }
    }
}

impl From<&AnalysisConfig> for CvOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            dissimilarity: config.dissimilarity,
            test_individual_features: config.test_individual_features,
            parallel: config.parallel,
            progress_interval: config.progress_interval,
        }
    }
}

enum FoldStatus {
    Completed(FoldOutcome),
    Failed(FoldFailure),
}

/// Runs leave-two-out cross-validation over an aligned dataset.
pub struct CrossValidator {
    options: CvOptions,
    progress: Option<Box<ProgressFn>>,
    cancel: CancelToken,
}

impl CrossValidator {
    pub fn new(options: CvOptions) -> Self {
        Self {
            options,
            progress: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_progress(
        mut self,
        progress: impl Fn(usize, usize) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &CvOptions {
        &self.options
    }

    /// Run every fold and accumulate rows in pair order.
    ///
    /// Recoverable fold failures are recorded and skipped; any other error
    /// aborts the run.
    pub fn run(&self, dataset: &AnalysisDataset) -> Result<AnalysisOutput> {
        let num_items = dataset.num_items();
        if num_items < 3 {
            return Err(NeurosemError::insufficient(format!(
                "leave-two-out needs at least 3 items to keep a training set, got {num_items}"
            )));
        }

        let splitter = LeaveTwoOut::new(num_items);
        let total = splitter.num_folds();
        let pairs: Vec<ItemPair> = splitter.pairs().collect();
        let started = Instant::now();

        info!(
            subject = dataset.subject(),
            items = num_items,
            channels = dataset.num_channels(),
            features = dataset.num_features(),
            folds = total,
            parallel = self.options.parallel,
            "starting leave-two-out analysis"
        );

        let completed = AtomicUsize::new(0);
        let evaluate = |pair: ItemPair| -> Result<FoldStatus> {
            let status = self.evaluate(dataset, pair)?;
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            self.report(done, total);
            Ok(status)
        };

        let statuses: Vec<FoldStatus> = if self.options.parallel {
            pairs.par_iter().map(|&pair| evaluate(pair)).collect::<Result<_>>()?
        } else {
            pairs.iter().map(|&pair| evaluate(pair)).collect::<Result<_>>()?
        };

        let mut output = AnalysisOutput::new(
            dataset.subject(),
            total,
            self.options.test_individual_features,
        );
        for status in statuses {
            match status {
                FoldStatus::Completed(outcome) => output.push(outcome),
                FoldStatus::Failed(failure) => output.push_failure(failure),
            }
        }

        info!(
            rows = output.results.len(),
            failed_folds = output.failed_folds.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "leave-two-out analysis finished"
        );
        Ok(output)
    }

    /// Fit, predict and score one held-out pair.
    pub fn run_fold(&self, dataset: &AnalysisDataset, pair: ItemPair) -> Result<FoldOutcome> {
        let fold = Fold::split(
            pair,
            dataset.responses().values().view(),
            dataset.features().values().view(),
        )?;
        let context = FoldContext::new(dataset, pair);

        let model = EncodingModel::fit(fold.train_x.view(), fold.train_y.view())?;
        let r2 = model.score(fold.train_x.view(), fold.train_y.view())?;
        debug!(%pair, r2, "fitted encoding model");

        let mut trials: Vec<TrialResult> =
            Vec::with_capacity(Variant::ALL.len() * ScoringRule::ALL.len());
        for variant in Variant::ALL {
            let predicted = variant.predict(&fold, &model)?;
            let scores = score_pair(
                predicted.actual.view(),
                predicted.predicted.view(),
                self.options.dissimilarity,
            )?;
            trials.extend(scores.iter().map(|score| record_trial(&context, variant, r2, score)));
        }

        let by_feature = if self.options.test_individual_features {
            ablate_features(
                &fold,
                &context,
                dataset.features().feature_names(),
                self.options.dissimilarity,
                self.options.parallel,
            )?
        } else {
            Vec::new()
        };

        Ok(FoldOutcome {
            trials,
            by_feature,
            coefficients: FoldCoefficients {
                pair,
                betas: model.into_coefficients(),
            },
        })
    }

    fn evaluate(&self, dataset: &AnalysisDataset, pair: ItemPair) -> Result<FoldStatus> {
        if self.cancel.is_cancelled() {
            return Err(NeurosemError::Cancelled);
        }
        match self.run_fold(dataset, pair) {
            Ok(outcome) => Ok(FoldStatus::Completed(outcome)),
            Err(err) if err.is_fold_recoverable() => {
                warn!(%pair, code = err.code(), error = %err, "skipping fold");
                Ok(FoldStatus::Failed(FoldFailure::new(pair, &err)))
            }
            Err(err) => Err(err),
        }
    }

    fn report(&self, done: usize, total: usize) {
        if let Some(progress) = &self.progress {
            let interval = self.options.progress_interval.max(1);
            if done % interval == 0 || done == total {
                progress(done, total);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeatureMatrix, ItemInfo, ResponseMatrix};
    use crate::eval::{Method, Task};
    use ndarray::Array2;
    use std::sync::Mutex;

    /// Items on a smooth curve so every fold is well-conditioned.
    fn dataset(num_items: usize) -> AnalysisDataset {
        let features = Array2::from_shape_fn((num_items, 3), |(i, j)| {
            let t = i as f64 + 1.0;
            ((t * (j as f64 + 1.0) * 0.7).sin() + 1.0) / 2.0
        });
        let w = Array2::from_shape_fn((3, 5), |(j, c)| ((j * 5 + c) as f64 * 1.3).cos());
        let responses = features.dot(&w);

        let items: Vec<ItemInfo> = (0..num_items)
            .map(|i| ItemInfo {
                name: format!("item{i}"),
                category: if i % 2 == 0 { "even".into() } else { "odd".into() },
                category_id: i % 2,
            })
            .collect();
        let names = items.iter().map(|item| item.name.clone()).collect();

        AnalysisDataset::new(
            ResponseMatrix::new("S1", responses, items).unwrap(),
            FeatureMatrix::new(features, names, vec!["a".into(), "b".into(), "c".into()])
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_row_counts_and_order() {
        let output = CrossValidator::new(CvOptions::default()).run(&dataset(6)).unwrap();

        assert_eq!(output.total_folds, 15);
        assert_eq!(output.completed_folds(), 15);
        assert_eq!(output.results.len(), 15 * 8);
        assert!(output.results_by_feature.is_none());
        assert!(output.failed_folds.is_empty());

        let first: Vec<_> = output.results[..8]
            .iter()
            .map(|r| (r.item1_idx, r.item2_idx, r.task, r.method, r.scoring))
            .collect();
        assert_eq!(
            first[0],
            (0, 1, Task::BrainPrediction, Method::EncodingModel, ScoringRule::Individual)
        );
        assert_eq!(first[1].4, ScoringRule::Combo);
        assert_eq!(first[2].2, Task::MindReading);
        assert_eq!(first[4].3, Method::BotasticTemplates);
        assert_eq!((output.results[8].item1_idx, output.results[8].item2_idx), (0, 2));
        assert_eq!(output.coefficients[0].betas.dim(), (5, 3));
    }

    #[test]
    fn test_same_category_flag() {
        let output = CrossValidator::new(CvOptions::default()).run(&dataset(5)).unwrap();
        for row in &output.results {
            assert_eq!(row.is_same_category(), row.item1_idx % 2 == row.item2_idx % 2);
            assert_eq!(row.brain_subject, "S1");
        }
    }

    #[test]
    fn test_parallel_output_matches_sequential() {
        let data = dataset(7);
        let options = CvOptions { test_individual_features: true, ..CvOptions::default() };
        let sequential = CrossValidator::new(options).run(&data).unwrap();
        let parallel = CrossValidator::new(CvOptions { parallel: true, ..options })
            .run(&data)
            .unwrap();

        assert_eq!(sequential.to_json().unwrap(), parallel.to_json().unwrap());
        assert_eq!(sequential.coefficients, parallel.coefficients);
    }

    #[test]
    fn test_ablation_rows() {
        let options = CvOptions { test_individual_features: true, ..CvOptions::default() };
        let output = CrossValidator::new(options).run(&dataset(5)).unwrap();
        let rows = output.results_by_feature.unwrap();
        assert_eq!(rows.len(), 10 * 3 * 2);
        assert!(rows.iter().all(|r| r.trial.task == Task::BrainPrediction
            && r.trial.method == Method::EncodingModel));
    }

    #[test]
    fn test_progress_cadence() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let options = CvOptions { progress_interval: 4, ..CvOptions::default() };
        CrossValidator::new(options)
            .with_progress(move |done, total| sink.lock().unwrap().push((done, total)))
            .run(&dataset(5))
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![(4, 10), (8, 10), (10, 10)]);
    }

    #[test]
    fn test_numerical_failures_skip_folds() {
        let clean = dataset(6);
        let mut responses = clean.responses().values().clone();
        responses[[2, 1]] = f64::NAN;
        let broken = AnalysisDataset::new(
            ResponseMatrix::new("S1", responses, clean.responses().items().to_vec()).unwrap(),
            clean.features().clone(),
        )
        .unwrap();

        let output = CrossValidator::new(CvOptions::default()).run(&broken).unwrap();

        // every fold that trains on item 2 hits the non-finite solve
        assert_eq!(output.total_folds, 15);
        assert_eq!(output.failed_folds.len(), 10);
        assert_eq!(output.completed_folds(), 5);
        assert_eq!(output.results.len(), 5 * 8);
        assert!(output.failed_folds.iter().all(|f| f.code == "E070" && !f.pair.contains(2)));
        assert!(output.coefficients.iter().all(|c| c.pair.contains(2)));
        assert!(output.results.iter().all(|r| r.item1_idx == 2 || r.item2_idx == 2));
    }

    #[test]
    fn test_cancelled_run_aborts() {
        let token = CancelToken::new();
        token.cancel();
        let err = CrossValidator::new(CvOptions::default())
            .with_cancel_token(token)
            .run(&dataset(5))
            .unwrap_err();
        assert!(matches!(err, NeurosemError::Cancelled));
    }

    #[test]
    fn test_cancel_between_folds() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let options = CvOptions { progress_interval: 1, ..CvOptions::default() };
        let result = CrossValidator::new(options)
            .with_cancel_token(token)
            .with_progress(move |done, _| {
                if done == 3 {
                    trigger.cancel();
                }
            })
            .run(&dataset(6));
        assert!(matches!(result, Err(NeurosemError::Cancelled)));
    }

    #[test]
    fn test_too_few_items() {
        let err = CrossValidator::new(CvOptions::default()).run(&dataset(2)).unwrap_err();
        assert!(matches!(err, NeurosemError::InsufficientData { .. }));
    }

    #[test]
    fn test_run_fold_direct() {
        let data = dataset(6);
        let validator = CrossValidator::new(CvOptions::default());
        let outcome = validator.run_fold(&data, ItemPair::new(2, 5).unwrap()).unwrap();
        assert_eq!(outcome.trials.len(), 8);
        assert!(outcome.by_feature.is_empty());
        assert!(outcome.trials.iter().all(|r| r.item1_name == "item2" && r.item2_name == "item5"));
    }
}
