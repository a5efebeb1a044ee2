//! The raw config file.

use std::fs;
use std::path::Path;

use anyhow::{Context as ResultExt, Result};
use serde::Deserialize;

/// The contents of the configuration file, exactly as written.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// The output directory files are classified into.
    pub output: Option<String>,
    /// The active path template.
    pub template: Option<String>,
    /// Extra directories to search for plugin units.
    pub plugin_dirs: Vec<String>,
    /// The hash algorithm name for copy verification; empty disables it.
    pub hash: Option<String>,
    /// The chunk size for the copy engine, in bytes.
    pub chunk_size: Option<u64>,
    /// The number of copy workers.
    pub workers: Option<usize>,
    /// Any unrecognized keys.
    #[serde(flatten)]
    pub rest: toml::Table,
}

impl RawConfig {
    /// Read a `RawConfig` from the given path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(s!("failed to read from `{}`", path.display()))?;
        let config: Self =
            toml::from_str(&contents).context("failed to deserialize contents as TOML")?;
        Ok(config)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn raw_config_empty() {
        let raw: RawConfig = toml::from_str("").unwrap();
        assert_eq!(raw.output, None);
        assert_eq!(raw.template, None);
        assert!(raw.plugin_dirs.is_empty());
        assert!(raw.rest.is_empty());
    }

    #[test]
    fn raw_config_full() {
        let raw: RawConfig = toml::from_str(
            r#"
            output = "~/sorted"
            template = "{primary_group}/{filename}"
            plugin_dirs = ["~/.curator/extra"]
            hash = "sha256"
            chunk_size = 2097152
            workers = 8
            "#,
        )
        .unwrap();
        assert_eq!(raw.output.as_deref(), Some("~/sorted"));
        assert_eq!(raw.template.as_deref(), Some("{primary_group}/{filename}"));
        assert_eq!(raw.plugin_dirs, ["~/.curator/extra"]);
        assert_eq!(raw.hash.as_deref(), Some("sha256"));
        assert_eq!(raw.chunk_size, Some(2 * 1024 * 1024));
        assert_eq!(raw.workers, Some(8));
    }

    #[test]
    fn raw_config_unknown_keys_are_kept() {
        let raw: RawConfig = toml::from_str("output = '/out'\nwat = 1").unwrap();
        assert!(raw.rest.contains_key("wat"));
    }
}
