//! Animator configuration file handling
//!
//! The CLI reads an optional `whimsy.toml` holding an [`AnimatorConfig`].
//! Missing fields fall back to their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use whimsy_gallery::AnimatorConfig;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "whimsy.toml";

/// Load the animator config from `path`, or from `whimsy.toml` if present
pub fn load(path: Option<&Path>) -> Result<AnimatorConfig> {
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(AnimatorConfig::default());
            }
            fallback
        }
    };

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config =
        AnimatorConfig::from_toml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded animator config from {}", path.display());
    Ok(config)
}

/// Default config rendered as TOML, as a starting point for `whimsy.toml`
pub fn default_toml() -> Result<String> {
    toml::to_string_pretty(&AnimatorConfig::default()).context("Failed to serialize default config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toml_loads_back() {
        let text = default_toml().unwrap();
        assert_eq!(AnimatorConfig::from_toml_str(&text).unwrap(), AnimatorConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/whimsy.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
