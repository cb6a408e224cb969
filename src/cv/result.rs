//! Typed result rows and the accumulated output of a run.

use super::fold::FoldContext;
use super::pairs::ItemPair;
use crate::eval::{Method, PairScore, ScoringRule, Task, Variant};
use crate::{NeurosemError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One row per (pair, task, method, scoring).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub brain_subject: String,
    pub item1_idx: usize,
    pub item2_idx: usize,
    pub item1_name: String,
    pub item2_name: String,
    pub item1_cat: String,
    pub item2_cat: String,
    /// 1 when both items share a category, else 0
    pub same_category: u8,
    pub r2_score: f64,
    pub task: Task,
    pub method: Method,
    pub scoring: ScoringRule,
    pub dist11: f64,
    pub dist22: f64,
    pub dist12: f64,
    pub dist21: f64,
    pub correct: f64,
}

impl TrialResult {
    pub fn pair(&self) -> Result<ItemPair> {
        ItemPair::new(self.item1_idx, self.item2_idx)
    }

    pub fn is_same_category(&self) -> bool {
        self.same_category == 1
    }

    pub fn variant(&self) -> Variant {
        Variant::new(self.task, self.method)
    }
}

/// Build a result row from explicit fold context and score.
pub fn record_trial(
    context: &FoldContext,
    variant: Variant,
    r2_score: f64,
    score: &PairScore,
) -> TrialResult {
    TrialResult {
        brain_subject: context.subject.clone(),
        item1_idx: context.pair.item1(),
        item2_idx: context.pair.item2(),
        item1_name: context.item1_name.clone(),
        item2_name: context.item2_name.clone(),
        item1_cat: context.item1_category.clone(),
        item2_cat: context.item2_category.clone(),
        same_category: u8::from(context.same_category),
        r2_score,
        task: variant.task,
        method: variant.method,
        scoring: score.rule,
        dist11: score.distances.dist11,
        dist22: score.distances.dist22,
        dist12: score.distances.dist12,
        dist21: score.distances.dist21,
        correct: score.correct,
    }
}

/// A trial row scoped to a single feature column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureAblationResult {
    pub feat_num: usize,
    pub feat_name: String,
    #[serde(flatten)]
    pub trial: TrialResult,
}

/// Coefficients of one fold's encoding model, `channels × features`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoldCoefficients {
    pub pair: ItemPair,
    pub betas: Array2<f64>,
}

/// A fold skipped after a recoverable numerical failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldFailure {
    pub pair: ItemPair,
    pub code: String,
    pub message: String,
}

impl FoldFailure {
    pub fn new(pair: ItemPair, error: &NeurosemError) -> Self {
        Self {
            pair,
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Everything one fold contributes.
#[derive(Clone, Debug)]
pub struct FoldOutcome {
    pub trials: Vec<TrialResult>,
    pub by_feature: Vec<FeatureAblationResult>,
    pub coefficients: FoldCoefficients,
}

/// Accumulated output of a full run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub subject: String,
    /// Pairs enumerated, including failed ones
    pub total_folds: usize,
    pub results: Vec<TrialResult>,
    /// Present only when per-feature ablation ran
    pub results_by_feature: Option<Vec<FeatureAblationResult>>,
    /// One entry per fold that completed, in pair order
    pub coefficients: Vec<FoldCoefficients>,
    pub failed_folds: Vec<FoldFailure>,
}

impl AnalysisOutput {
    pub fn new(subject: impl Into<String>, total_folds: usize, with_features: bool) -> Self {
        Self {
            subject: subject.into(),
            total_folds,
            results: Vec::with_capacity(total_folds * Variant::ALL.len() * ScoringRule::ALL.len()),
            results_by_feature: with_features.then(Vec::new),
            coefficients: Vec::with_capacity(total_folds),
            failed_folds: Vec::new(),
        }
    }

    /// Append a completed fold.
    pub fn push(&mut self, outcome: FoldOutcome) {
        self.results.extend(outcome.trials);
        if let Some(rows) = self.results_by_feature.as_mut() {
            rows.extend(outcome.by_feature);
        }
        self.coefficients.push(outcome.coefficients);
    }

    /// Record a skipped fold.
    pub fn push_failure(&mut self, failure: FoldFailure) {
        self.failed_folds.push(failure);
    }

    /// Folds that produced rows.
    pub fn completed_folds(&self) -> usize {
        self.coefficients.len()
    }

    /// Rows matching a configuration.
    pub fn rows(
        &self,
        task: Task,
        method: Method,
        scoring: ScoringRule,
    ) -> impl Iterator<Item = &TrialResult> {
        self.results
            .iter()
            .filter(move |r| r.task == task && r.method == method && r.scoring == scoring)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NeurosemError::Serialization { message: e.to_string() })
    }
}
