//! Configuration loading from uncss.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Main configuration structure for uncss.toml.
#[derive(Debug, Deserialize, Default)]
pub struct UncssConfig {
    /// Selectors or `/patterns/` to always retain.
    pub ignore: Option<Vec<String>>,
    /// Selector modifiers (pseudo-classes, state classes) to strip before
    /// matching, in addition to the built-in table.
    pub ignore_modifiers: Option<Vec<String>>,
    /// Upper bound on documents analyzed concurrently.
    pub concurrency: Option<usize>,
    /// Directory for the per-document usage cache.
    pub cache_dir: Option<String>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

/// Loads configuration from uncss.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<UncssConfig>> {
    let path = root.join("uncss.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&content).context("Invalid uncss.toml")?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = std::env::temp_dir().join(format!("uncss_cfg_none_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        assert!(load_config(&dir).unwrap().is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config_parses() {
        let dir = std::env::temp_dir().join(format!("uncss_cfg_full_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("uncss.toml"),
            r#"
ignore = [".keep-me", "/^\\.vendor-/"]
ignore_modifiers = [".is-open"]
concurrency = 4
cache_dir = ".uncss-cache"

[output]
format = "json"
"#,
        )
        .unwrap();

        let cfg = load_config(&dir).unwrap().unwrap();
        assert_eq!(cfg.ignore.unwrap().len(), 2);
        assert_eq!(cfg.ignore_modifiers.unwrap(), vec![".is-open"]);
        assert_eq!(cfg.concurrency, Some(4));
        assert_eq!(cfg.cache_dir.as_deref(), Some(".uncss-cache"));
        assert_eq!(cfg.output.unwrap().format.as_deref(), Some("json"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = std::env::temp_dir().join(format!("uncss_cfg_bad_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("uncss.toml"), "ignore = not-a-list").unwrap();
        assert!(load_config(&dir).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
