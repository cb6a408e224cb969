//! Statistics for leave-two-out forced-choice accuracies.
//!
//! Fold accuracies are 0, 0.5 or 1, so the questions asked of them are
//! simple: is the mean above chance, and do two groups of folds differ.

pub mod analyzer;

pub use analyzer::{
    confidence_interval, mean_and_std, StatisticalAnalyzer, TestResult, CHANCE_LEVEL,
};
