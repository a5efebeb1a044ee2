//! Plugin unit manifests.
//!
//! A plugin unit is either a single `<name>.toml` file or a directory
//! `<name>/` containing an entrypoint file named `main.toml`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as ResultExt, Result};
use serde::Deserialize;
use walkdir::WalkDir;

/// A plugin unit found on disk.
#[derive(Debug, Clone)]
pub struct Unit {
    /// The plugin name: the file stem or the directory name.
    pub name: String,
    /// The manifest file.
    pub path: PathBuf,
}

/// The built-in analyzer implementation backing a plugin unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    FileDate,
    FileSize,
    Grouping,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileDate => f.write_str("file-date"),
            Self::FileSize => f.write_str("file-size"),
            Self::Grouping => f.write_str("grouping"),
        }
    }
}

/// A variable declared by a plugin.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The manifest contents of a plugin unit.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub description: Option<String>,
    pub kind: Kind,
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
    /// Kind-specific configuration, owned by the analyzer instance.
    #[serde(default)]
    pub config: toml::Table,
}

impl Manifest {
    /// Read a manifest from the given path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(s!("failed to read from `{}`", path.display()))?;
        let manifest: Self =
            toml::from_str(&contents).context("failed to deserialize manifest as TOML")?;
        Ok(manifest)
    }
}

/// Find the plugin units directly under the given directory, in file name
/// order.
pub fn find_units(dir: &Path) -> Vec<Unit> {
    let mut units = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker.into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if entry.file_type().is_dir() {
            let main = path.join("main.toml");
            if let (true, Some(name)) = (main.is_file(), path.file_name()) {
                units.push(Unit {
                    name: name.to_string_lossy().into_owned(),
                    path: main,
                });
            }
        } else if path.extension().map_or(false, |ext| ext == "toml") {
            if let Some(name) = path.file_stem() {
                units.push(Unit {
                    name: name.to_string_lossy().into_owned(),
                    path: path.to_path_buf(),
                });
            }
        }
    }
    units
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
