//! Analysis configuration schema
//!
//! Loadable from YAML or JSON. Boolean switches accept quoted strings.

use crate::linalg::Dissimilarity;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a bool from either a boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Options for one subject's leave-two-out analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Most reliable channels to keep (`None` keeps all)
    #[serde(default = "default_num_voxels")]
    pub num_voxels: Option<usize>,

    /// Z-score each channel across items before selection
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub zscore_braindata: bool,

    /// Permute each item's features (sanity check)
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub shuffle_features: bool,

    /// Also score single-feature encoding models
    #[serde(
        default,
        alias = "testIndividualFeatures",
        deserialize_with = "deserialize_bool_lenient"
    )]
    pub test_individual_features: bool,

    /// Seed for the shuffle RNG; entropy-seeded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Distance used by the forced-choice scorer
    #[serde(default)]
    pub dissimilarity: Dissimilarity,

    /// Run folds on the rayon thread pool
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub parallel: bool,

    /// Completed folds between progress callbacks
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            num_voxels: default_num_voxels(),
            zscore_braindata: false,
            shuffle_features: false,
            test_individual_features: false,
            seed: None,
            dissimilarity: Dissimilarity::default(),
            parallel: false,
            progress_interval: default_progress_interval(),
        }
    }
}

fn default_num_voxels() -> Option<usize> {
    Some(500)
}

fn default_progress_interval() -> usize {
    100
}
