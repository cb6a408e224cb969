//! Configuration validation

use super::schema::AnalysisConfig;
use crate::NeurosemError;

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid num_voxels: {0} (must be > 0, or null to keep all channels)")]
    InvalidNumVoxels(usize),

    #[error("Invalid progress_interval: {0} (must be > 0)")]
    InvalidProgressInterval(usize),
}

impl ValidationError {
    /// Config field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidNumVoxels(_) => "num_voxels",
            Self::InvalidProgressInterval(_) => "progress_interval",
        }
    }

    fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidNumVoxels(_) => "use a positive channel count such as 500",
            Self::InvalidProgressInterval(_) => "use 1 to report after every fold",
        }
    }
}

impl From<ValidationError> for NeurosemError {
    fn from(err: ValidationError) -> Self {
        NeurosemError::ConfigValue {
            field: err.field().to_string(),
            message: err.to_string(),
            suggestion: err.suggestion().to_string(),
        }
    }
}

/// Validate an analysis configuration before any data is touched
pub fn validate_config(config: &AnalysisConfig) -> Result<(), ValidationError> {
    if config.num_voxels == Some(0) {
        return Err(ValidationError::InvalidNumVoxels(0));
    }

    if config.progress_interval == 0 {
        return Err(ValidationError::InvalidProgressInterval(0));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AnalysisConfig::default()).is_ok());
    }

    #[test]
    fn test_unbounded_voxels_is_valid() {
        let config = AnalysisConfig {
            num_voxels: None,
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_voxels() {
        let config = AnalysisConfig {
            num_voxels: Some(0),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNumVoxels(0)));
    }

    #[test]
    fn test_zero_progress_interval_converts_to_config_value() {
        let config = AnalysisConfig {
            progress_interval: 0,
            ..Default::default()
        };
        let err: NeurosemError = validate_config(&config).unwrap_err().into();
        assert_eq!(err.code(), "E003");
        match err {
            NeurosemError::ConfigValue { field, .. } => assert_eq!(field, "progress_interval"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
