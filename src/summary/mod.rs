//! Accuracy summary of a finished analysis

use crate::cv::{AnalysisOutput, TrialResult};
use crate::eval::{Method, ScoringRule, Task, Variant};
use crate::{NeurosemError, Result};
use neurosem_stats::{
    confidence_interval, mean_and_std, StatisticalAnalyzer, TestResult, CHANCE_LEVEL,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Accuracy of one (task, method, scoring) configuration across folds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSummary {
    pub task: Task,
    pub method: Method,
    pub scoring: ScoringRule,
    /// Rows contributing
    pub n: usize,
    pub mean: f64,
    pub std: f64,
    /// 95% confidence interval of the mean
    pub ci: (f64, f64),
    /// One-sample t-test against chance
    pub vs_chance: TestResult,
    pub same_category: f64,
    pub different_category: f64,
    /// Welch t-test between same- and different-category pairs
    pub same_vs_different: TestResult,
}

/// Combo accuracy for pairs involving one category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryAccuracy {
    pub category: String,
    pub accuracy: f64,
    pub n: usize,
}

/// Combo accuracy of one single-feature model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureAccuracy {
    pub feat_num: usize,
    pub feat_name: String,
    pub accuracy: f64,
    pub n: usize,
}

/// Summary statistics for one subject's run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub subject: String,
    pub total_folds: usize,
    pub failed_folds: usize,
    /// In variant order, individual before combo
    pub configurations: Vec<ConfigurationSummary>,
    /// Brain-prediction encoding-model combo accuracy per category, by name
    pub by_category: Vec<CategoryAccuracy>,
    /// Single-feature models, best first; empty without ablation
    pub top_features: Vec<FeatureAccuracy>,
}

/// Summarize accuracies of a finished run.
pub fn summarize(output: &AnalysisOutput) -> AnalysisSummary {
    let configurations = Variant::ALL
        .iter()
        .flat_map(|variant| ScoringRule::ALL.map(|rule| (*variant, rule)))
        .map(|(variant, rule)| {
            let rows: Vec<&TrialResult> =
                output.rows(variant.task, variant.method, rule).collect();
            summarize_configuration(variant, rule, &rows)
        })
        .collect();

    AnalysisSummary {
        subject: output.subject.clone(),
        total_folds: output.total_folds,
        failed_folds: output.failed_folds.len(),
        configurations,
        by_category: category_breakdown(output),
        top_features: rank_features(output),
    }
}

fn summarize_configuration(
    variant: Variant,
    scoring: ScoringRule,
    rows: &[&TrialResult],
) -> ConfigurationSummary {
    let correct: Vec<f64> = rows.iter().map(|r| r.correct).collect();
    let (mean, std) = mean_and_std(&correct);
    let (same, different): (Vec<f64>, Vec<f64>) = {
        let (same, different): (Vec<&TrialResult>, Vec<&TrialResult>) =
            rows.iter().copied().partition(|r| r.is_same_category());
        (
            same.iter().map(|r| r.correct).collect(),
            different.iter().map(|r| r.correct).collect(),
        )
    };

    ConfigurationSummary {
        task: variant.task,
        method: variant.method,
        scoring,
        n: rows.len(),
        mean,
        std,
        ci: confidence_interval(&correct, 0.95),
        vs_chance: StatisticalAnalyzer::one_sample_t_test(&correct, CHANCE_LEVEL),
        same_category: mean_of(&same),
        different_category: mean_of(&different),
        same_vs_different: StatisticalAnalyzer::welch_t_test(&same, &different),
    }
}

fn mean_of(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return f64::NAN;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

fn category_breakdown(output: &AnalysisOutput) -> Vec<CategoryAccuracy> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in output.rows(Task::BrainPrediction, Method::EncodingModel, ScoringRule::Combo) {
        let mut categories = vec![row.item1_cat.as_str()];
        if row.item2_cat != row.item1_cat {
            categories.push(row.item2_cat.as_str());
        }
        for category in categories {
            let entry = totals.entry(category).or_insert((0.0, 0));
            entry.0 += row.correct;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(category, (sum, n))| CategoryAccuracy {
            category: category.to_string(),
            accuracy: sum / n as f64,
            n,
        })
        .collect()
}

fn rank_features(output: &AnalysisOutput) -> Vec<FeatureAccuracy> {
    let Some(rows) = &output.results_by_feature else {
        return Vec::new();
    };

    let mut totals: BTreeMap<usize, (&str, f64, usize)> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.trial.scoring == ScoringRule::Combo) {
        let entry = totals
            .entry(row.feat_num)
            .or_insert((row.feat_name.as_str(), 0.0, 0));
        entry.1 += row.trial.correct;
        entry.2 += 1;
    }

    let mut ranked: Vec<FeatureAccuracy> = totals
        .into_iter()
        .map(|(feat_num, (name, sum, n))| FeatureAccuracy {
            feat_num,
            feat_name: name.to_string(),
            accuracy: sum / n as f64,
            n,
        })
        .collect();
    // stable sort keeps feature order among ties
    ranked.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));
    ranked
}

impl AnalysisSummary {
    /// Mean accuracy of one configuration, if it produced rows.
    pub fn accuracy(&self, task: Task, method: Method, scoring: ScoringRule) -> Option<f64> {
        self.configurations
            .iter()
            .find(|c| c.task == task && c.method == method && c.scoring == scoring)
            .filter(|c| c.n > 0)
            .map(|c| c.mean)
    }

    /// The `k` best single-feature models.
    pub fn top_features(&self, k: usize) -> &[FeatureAccuracy] {
        &self.top_features[..k.min(self.top_features.len())]
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NeurosemError::Serialization { message: e.to_string() })
    }

    /// Render as an aligned text table.
    pub fn to_table(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Subject {}: {} folds ({} failed)",
            self.subject, self.total_folds, self.failed_folds
        )?;
        writeln!(
            f,
            "{:<18} {:<20} {:<10} {:>6} {:>7} {:>17} {:>8} {:>6} {:>6} {:>8}",
            "task", "method", "scoring", "n", "mean", "95% CI", "p", "same", "diff", "p(s-d)"
        )?;
        writeln!(f, "{}", "-".repeat(116))?;
        for c in &self.configurations {
            writeln!(
                f,
                "{:<18} {:<20} {:<10} {:>6} {:>7.4} [{:>6.3}, {:>6.3}] {:>8.4} {:>6.3} {:>6.3} {:>8.4}",
                c.task.name(),
                c.method.name(),
                c.scoring.name(),
                c.n,
                c.mean,
                c.ci.0,
                c.ci.1,
                c.vs_chance.p_value,
                c.same_category,
                c.different_category,
                c.same_vs_different.p_value
            )?;
        }

        if !self.by_category.is_empty() {
            writeln!(f)?;
            writeln!(f, "{:<18} {:>8} {:>6}", "category", "combo", "n")?;
            for c in &self.by_category {
                writeln!(f, "{:<18} {:>8.4} {:>6}", c.category, c.accuracy, c.n)?;
            }
        }

        if !self.top_features.is_empty() {
            writeln!(f)?;
            writeln!(f, "{:<6} {:<24} {:>8}", "feat", "name", "combo")?;
            for feat in self.top_features(10) {
                writeln!(f, "{:<6} {:<24} {:>8.4}", feat.feat_num, feat.feat_name, feat.accuracy)?;
            }
        }
        Ok(())
    }
}
