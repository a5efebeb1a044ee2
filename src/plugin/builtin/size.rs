//! The file size classifier analyzer.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context as ResultExt, Result};
use serde::Deserialize;

use crate::engine::env::Value;
use crate::plugin::Analyzer;

/// Classifies files into size categories by configurable byte thresholds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FileSize {
    enabled: bool,
    thresholds: Thresholds,
}

impl Default for FileSize {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: Thresholds::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Thresholds {
    tiny: u64,
    small: u64,
    medium: u64,
    large: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            tiny: 1024,
            small: 1024 * 1024,
            medium: 10 * 1024 * 1024,
            large: 100 * 1024 * 1024,
        }
    }
}

impl FileSize {
    pub fn from_config(config: &toml::Table) -> Result<Self> {
        toml::Value::Table(config.clone())
            .try_into()
            .context("failed to deserialize file size config")
    }

    fn classify(&self, size: u64) -> &'static str {
        let t = &self.thresholds;
        if size < t.tiny {
            "tiny"
        } else if size < t.small {
            "small"
        } else if size < t.medium {
            "medium"
        } else if size < t.large {
            "large"
        } else {
            "huge"
        }
    }
}

impl Analyzer for FileSize {
    fn init(&mut self) -> Result<()> {
        let t = &self.thresholds;
        if !(t.tiny < t.small && t.small < t.medium && t.medium < t.large) {
            bail!("thresholds must satisfy tiny < small < medium < large");
        }
        Ok(())
    }

    fn execute(&mut self, path: &Path) -> Result<Value> {
        if !self.enabled {
            return Ok(Value::Str("unknown".to_string()));
        }
        let category = match fs::metadata(path) {
            Ok(metadata) => self.classify(metadata.len()),
            Err(_) => "unknown",
        };
        Ok(Value::Str(category.to_string()))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
