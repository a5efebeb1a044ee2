//! Configuration.

mod edit;
mod file;
mod normalize;

use std::path::{Path, PathBuf};

use anyhow::{Error, Result};

pub use crate::config::edit::EditConfig;
use crate::config::file::RawConfig;
use crate::context::Context;
use crate::copy::HashAlgorithm;
use crate::engine::template::Template;

/// The template used when the config file does not set one.
pub const DEFAULT_TEMPLATE: &str = "{primary_group}/{filename}";

/// The normalized user configuration.
#[derive(Debug)]
pub struct Config {
    /// The output directory files are classified into.
    pub output: PathBuf,
    /// The active path template.
    pub template: Template,
    /// All directories searched for plugin units, default first.
    pub plugin_dirs: Vec<PathBuf>,
    /// The hash algorithm for copy verification, if any.
    pub hash: Option<HashAlgorithm>,
    /// The chunk size for the copy engine, in bytes.
    pub chunk_size: u64,
    /// The number of copy workers.
    pub workers: usize,
}

/// Read the config file at the given path and normalize it, collecting
/// non-fatal problems into `warnings`.
pub fn from_path(ctx: &Context, path: &Path, warnings: &mut Vec<Error>) -> Result<Config> {
    let raw = RawConfig::from_path(path)?;
    normalize::normalize(ctx, raw, warnings)
}
