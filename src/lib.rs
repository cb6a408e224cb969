//! Leave-two-out cross-validated prediction between neural responses and
//! semantic features.
//!
//! For every pair of stimulus items, models are trained on the remaining
//! items and asked to tell the two held-out items apart, in both directions:
//!
//! - **brain prediction**: features → responses
//! - **mind reading**: responses → features
//!
//! each with an OLS encoding model and with distance-based template matching,
//! scored under the individual and combo forced-choice rules.
//!
//! # Example
//!
//! ```no_run
//! use neurosem::config::load_config;
//! use neurosem::data::{RawFeatures, RawResponses};
//! use neurosem::{run_analysis, summarize};
//!
//! # fn load() -> (RawResponses, RawFeatures) { unimplemented!() }
//! let (responses, features) = load();
//! let config = load_config("analysis.yaml")?;
//! let output = run_analysis(&responses, &features, &config, None)?;
//! println!("{}", summarize(&output).to_table());
//! # Ok::<(), neurosem::NeurosemError>(())
//! ```

pub mod config;
pub mod cv;
pub mod data;
pub mod eval;
pub mod linalg;
pub mod model;
pub mod summary;

pub use neurosem_common::{NeurosemError, Result};

pub use config::AnalysisConfig;
pub use cv::{AnalysisOutput, CancelToken, CrossValidator, CvOptions};
pub use summary::{summarize, AnalysisSummary};

use config::validate_config;
use cv::ProgressFn;
use data::{check_item_order, prepare_features, prepare_responses, AnalysisDataset};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// Prepare both datasets and run the full leave-two-out analysis.
///
/// Item order is checked on the raw inputs before any preparation work, so a
/// mismatch aborts before a single fold runs.
pub fn run_analysis(
    raw_responses: &data::RawResponses,
    raw_features: &data::RawFeatures,
    config: &AnalysisConfig,
    progress: Option<Box<ProgressFn>>,
) -> Result<AnalysisOutput> {
    validate_config(config)?;
    check_item_order(
        raw_responses.item_names(),
        raw_features.item_names.iter().map(String::as_str),
    )?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let responses = prepare_responses(raw_responses, config.num_voxels, config.zscore_braindata)?;
    let features = prepare_features(raw_features, config.shuffle_features, &mut rng)?;
    let dataset = AnalysisDataset::new(responses, features)?;
    info!(
        subject = dataset.subject(),
        zscore = config.zscore_braindata,
        shuffle = config.shuffle_features,
        "prepared datasets"
    );

    let mut validator = CrossValidator::new(CvOptions::from(config));
    if let Some(progress) = progress {
        validator = validator.with_progress(progress);
    }
    validator.run(&dataset)
}
