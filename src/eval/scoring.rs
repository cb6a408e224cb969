//! Forced-choice scoring of a held-out pair.

use crate::linalg::Dissimilarity;
use crate::{NeurosemError, Result};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a pair of predictions is judged against the pair of actual vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// Average of two per-item judgments: 0, 0.5 or 1
    Individual,
    /// Matched assignment must beat the swapped one: 0 or 1
    Combo,
}

impl ScoringRule {
    /// Both rules, in the order rows are recorded.
    pub const ALL: [ScoringRule; 2] = [ScoringRule::Individual, ScoringRule::Combo];

    /// Correctness for the given cross-distances.
    ///
    /// Comparisons are strict, so ties and NaN distances count as wrong.
    pub fn score(self, d: &PairDistances) -> f64 {
        match self {
            Self::Combo => {
                let matched = d.dist11 + d.dist22;
                let swapped = d.dist12 + d.dist21;
                f64::from(u8::from(matched < swapped))
            }
            Self::Individual => {
                let first = u8::from(d.dist11 < d.dist12);
                let second = u8::from(d.dist22 < d.dist21);
                f64::from(first + second) / 2.0
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Combo => "combo",
        }
    }
}

impl fmt::Display for ScoringRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The four cross-distances between predicted and actual vectors.
///
/// `distIJ` compares prediction I with actual J.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairDistances {
    pub dist11: f64,
    pub dist22: f64,
    pub dist12: f64,
    pub dist21: f64,
}

impl PairDistances {
    /// Compute from two-row `actual` and `predicted` matrices.
    pub fn compute(
        actual: ArrayView2<'_, f64>,
        predicted: ArrayView2<'_, f64>,
        dissimilarity: Dissimilarity,
    ) -> Result<Self> {
        let (ar, ac) = actual.dim();
        let (pr, pc) = predicted.dim();
        if ar != 2 {
            return Err(NeurosemError::shape(
                "forced-choice actual rows",
                vec![2, ac],
                vec![ar, ac],
            ));
        }
        if (ar, ac) != (pr, pc) {
            return Err(NeurosemError::shape(
                "forced-choice predictions",
                vec![ar, ac],
                vec![pr, pc],
            ));
        }

        let dist = |p: usize, a: usize| dissimilarity.compute(predicted.row(p), actual.row(a));
        Ok(Self {
            dist11: dist(0, 0),
            dist22: dist(1, 1),
            dist12: dist(0, 1),
            dist21: dist(1, 0),
        })
    }
}

/// Distances plus the resulting correctness under one rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairScore {
    pub rule: ScoringRule,
    pub distances: PairDistances,
    pub correct: f64,
}

/// Score one predicted pair under both rules, individual first.
pub fn score_pair(
    actual: ArrayView2<'_, f64>,
    predicted: ArrayView2<'_, f64>,
    dissimilarity: Dissimilarity,
) -> Result<[PairScore; 2]> {
    let distances = PairDistances::compute(actual, predicted, dissimilarity)?;
    Ok(ScoringRule::ALL.map(|rule| PairScore {
        rule,
        distances,
        correct: rule.score(&distances),
    }))
}
