//! Optional `sqlweave.toml` configuration.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Render `create temporary table` statements.
    #[serde(default)]
    pub temporary: bool,
    /// Omit the `if not exists` guard.
    #[serde(default)]
    pub clobber: bool,
}

impl Config {
    /// Load the config at `path`, or the defaults when the file does
    /// not exist.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_sections_are_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.log.filter, "info");
        assert!(!config.render.temporary);
        assert!(!config.render.clobber);
    }

    #[test]
    fn sections_override_defaults() {
        let config: Config = toml::from_str(
            "[log]\nfilter = \"debug\"\n\n[render]\ntemporary = true\n",
        )
        .unwrap();
        assert_eq!(config.log.filter, "debug");
        assert!(config.render.temporary);
        assert!(!config.render.clobber);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[log]\nlevel = \"info\"\n").is_err());
    }
}
