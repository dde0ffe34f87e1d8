//! Model configuration file loading.
//!
//! The file is JSON; any field left out keeps its default, e.g.
//! ```text
//! { "n_estimators": 150, "max_depth": 4 }
//! ```

use anyhow::Context;
use std::path::Path;
use wcf_forecast::GradientBoostingParams;

/// Load model parameters from `path`, or the defaults when no path is given.
pub fn load_model_config(path: Option<&Path>) -> anyhow::Result<GradientBoostingParams> {
    let Some(path) = path else {
        return Ok(GradientBoostingParams::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model config {}", path.display()))?;
    let params: GradientBoostingParams = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse model config {}", path.display()))?;
    params.validate()?;
    log::info!("Loaded model config from {}: {:?}", path.display(), params);
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_path_gives_defaults() {
        let params = load_model_config(None).unwrap();
        assert_eq!(params, GradientBoostingParams::default());
    }

    #[test]
    fn test_partial_config_overrides_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n_estimators": 25, "learning_rate": 0.1}}"#).unwrap();
        let params = load_model_config(Some(file.path())).unwrap();
        assert_eq!(params.n_estimators, 25);
        assert_eq!(params.learning_rate, 0.1);
        assert_eq!(params.max_depth, 6);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"colsample": 1.5}}"#).unwrap();
        assert!(load_model_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_model_config(Some(Path::new("/nonexistent/model.json"))).is_err());
    }
}
