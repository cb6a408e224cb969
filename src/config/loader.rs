//! Loading analysis configuration from disk

use super::schema::AnalysisConfig;
use super::validate::validate_config;
use crate::{NeurosemError, Result};
use std::fs;
use std::path::Path;

/// Load, parse and validate a configuration file.
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<AnalysisConfig> {
    let path = config_path.as_ref();
    if !path.exists() {
        return Err(NeurosemError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)
        .map_err(|e| NeurosemError::io(format!("reading config {}", path.display()), e))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };
    let config: AnalysisConfig = parsed.map_err(|message| NeurosemError::ConfigParsing {
        path: path.to_path_buf(),
        message,
    })?;

    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(".yaml", "num_voxels: 50\nshuffle_features: \"true\"\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.num_voxels, Some(50));
        assert!(config.shuffle_features);
    }

    #[test]
    fn test_load_json() {
        let file = write_config(
            ".json",
            r#"{"testIndividualFeatures": true, "parallel": "false"}"#,
        );
        let config = load_config(file.path()).unwrap();
        assert!(config.test_individual_features);
        assert!(!config.parallel);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/analysis.yaml").unwrap_err();
        assert_eq!(err.code(), "E001");
    }

    #[test]
    fn test_parse_error() {
        let file = write_config(".yaml", "num_voxels: [unclosed\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, NeurosemError::ConfigParsing { .. }));
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let file = write_config(".yml", "progress_interval: 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, NeurosemError::ConfigValue { .. }));
        assert!(err.is_user_error());
    }
}
