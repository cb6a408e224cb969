//! Prediction variants and forced-choice scoring.
//!
//! - `predict`: the (task, method) dispatch table producing predicted pairs
//! - `scoring`: cross-distances and the combo/individual correctness rules

mod predict;
mod scoring;

pub use predict::{Method, PredictedPair, Task, Variant};
pub use scoring::{score_pair, PairDistances, PairScore, ScoringRule};
