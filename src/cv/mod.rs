//! Leave-two-out cross-validation.
//!
//! - `pairs`: item pair enumeration and train/test index splits
//! - `fold`: standardized partitions for one held-out pair
//! - `ablation`: single-feature encoding models
//! - `result`: typed result rows and the run output
//! - `driver`: iterates all pairs and accumulates rows

mod ablation;
mod driver;
mod fold;
mod pairs;
mod result;

pub use ablation::ablate_features;
pub use driver::{CancelToken, CrossValidator, CvOptions, ProgressFn};
pub use fold::{Fold, FoldContext};
pub use pairs::{ItemPair, LeaveTwoOut};
pub use result::{
    record_trial, AnalysisOutput, FeatureAblationResult, FoldCoefficients, FoldFailure,
    FoldOutcome, TrialResult,
};
