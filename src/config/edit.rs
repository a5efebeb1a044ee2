//! Edit the configuration file.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context as ResultExt, Result};

/// An editable config that preserves formatting and comments.
#[derive(Debug)]
pub struct EditConfig {
    /// The parsed TOML version of the config.
    doc: toml_edit::Document,
}

impl fmt::Display for EditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.doc)
    }
}

impl EditConfig {
    /// Returns the default config, optionally with the given output
    /// directory instead of the stock one.
    pub fn default(output: Option<&Path>) -> Self {
        let mut config =
            Self::from_str(include_str!("curator.toml")).expect("default config is valid");
        if let Some(output) = output {
            config.set_output(output);
        }
        config
    }

    /// Read the config from the given string.
    pub fn from_str<S>(s: S) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let doc = s
            .as_ref()
            .parse::<toml_edit::Document>()
            .context("failed to deserialize contents as TOML")?;
        Ok(Self { doc })
    }

    /// Read the config from the given path.
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(s!("failed to read from `{}`", path.display()))?;
        Self::from_str(contents)
    }

    /// The configured template, if set.
    pub fn template(&self) -> Option<&str> {
        self.doc.get("template").and_then(|item| item.as_str())
    }

    /// Replace the template.
    pub fn set_template(&mut self, template: &str) {
        self.doc["template"] = toml_edit::value(template);
    }

    /// Replace the output directory.
    pub fn set_output(&mut self, output: &Path) {
        self.doc["output"] = toml_edit::value(output.display().to_string());
    }

    /// Write the config to the given path.
    pub fn to_path<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        fs::write(path, self.doc.to_string())
            .with_context(s!("failed to write to `{}`", path.display()))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
