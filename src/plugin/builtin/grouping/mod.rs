//! The manual grouping analyzer.
//!
//! Files are matched against an ordered list of strategy groups. Within a
//! group every strategy must match (AND); the result for a file is the list
//! of names of all matching groups (OR), deduplicated in insertion order.

pub mod wildcard;

use std::path::Path;

use anyhow::{anyhow, Context as ResultExt, Result};
use indexmap::IndexSet;
use regex::Regex;
use serde::Deserialize;

use crate::engine::env::Value;
use crate::plugin::builtin::grouping::wildcard::Pattern;
use crate::plugin::Analyzer;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    name: String,
    #[serde(default)]
    strategies: Vec<RawStrategy>,
}

#[derive(Debug, Deserialize)]
struct RawStrategy {
    #[serde(rename = "type")]
    kind: StrategyKind,
    pattern: String,
    constraints: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StrategyKind {
    Contains,
    Wildcard,
    Regex,
}

/// A single compiled matching rule.
#[derive(Debug)]
enum Strategy {
    Contains(String),
    Wildcard(Pattern),
    Regex(Regex),
}

impl Strategy {
    fn compile(raw: &RawStrategy) -> Result<Self> {
        match raw.kind {
            StrategyKind::Contains => Ok(Self::Contains(raw.pattern.clone())),
            StrategyKind::Wildcard => Ok(Self::Wildcard(Pattern::new(
                &raw.pattern,
                raw.constraints.as_deref(),
            )?)),
            StrategyKind::Regex => Ok(Self::Regex(
                Regex::new(&raw.pattern)
                    .with_context(s!("failed to compile regex `{}`", raw.pattern))?,
            )),
        }
    }

    fn matches(&self, filename: &str) -> bool {
        match self {
            Self::Contains(text) => filename.contains(text),
            Self::Wildcard(pattern) => pattern.matches(filename).is_some(),
            Self::Regex(regex) => regex.is_match(filename),
        }
    }
}

#[derive(Debug)]
struct Group {
    name: String,
    strategies: Vec<Strategy>,
}

/// The grouping analyzer, owning its compiled rule list.
#[derive(Debug, Default)]
pub struct Grouping {
    groups: Vec<Group>,
}

impl Grouping {
    /// Construct the analyzer from its unit config. Strategies that fail to
    /// compile are rejected individually; a group left with no usable
    /// strategies matches nothing.
    pub fn from_config(config: &toml::Table) -> Result<Self> {
        let raw: RawConfig = toml::Value::Table(config.clone())
            .try_into()
            .context("failed to deserialize grouping config")?;

        let mut groups = Vec::with_capacity(raw.groups.len());
        for raw_group in raw.groups {
            let strategies: Vec<_> = raw_group
                .strategies
                .iter()
                .filter_map(|raw| Strategy::compile(raw).ok())
                .collect();
            if strategies.is_empty() {
                continue;
            }
            groups.push(Group {
                name: raw_group.name,
                strategies,
            });
        }
        Ok(Self { groups })
    }

    /// The deduplicated, insertion-ordered names of the groups that match.
    fn decide(&self, filename: &str) -> Vec<String> {
        let mut names = IndexSet::new();
        for group in &self.groups {
            if group.strategies.iter().all(|s| s.matches(filename)) {
                names.insert(group.name.clone());
            }
        }
        names.into_iter().collect()
    }
}

impl Analyzer for Grouping {
    fn execute(&mut self, path: &Path) -> Result<Value> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("`{}` has no file name", path.display()))?;
        Ok(Value::List(self.decide(&filename)))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
