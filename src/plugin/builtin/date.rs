//! The file date analyzer.

use std::fmt::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context as ResultExt, Result};
use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::engine::env::Value;
use crate::plugin::Analyzer;
use crate::util::PathExt;

/// Reads a date for a file from its modified time.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FileDate {
    enabled: bool,
    format: String,
}

impl Default for FileDate {
    fn default() -> Self {
        Self {
            enabled: true,
            format: "%Y-%m-%d".to_string(),
        }
    }
}

impl FileDate {
    pub fn from_config(config: &toml::Table) -> Result<Self> {
        toml::Value::Table(config.clone())
            .try_into()
            .context("failed to deserialize file date config")
    }
}

impl Analyzer for FileDate {
    fn init(&mut self) -> Result<()> {
        // Catch a bad format string up front rather than on every file.
        if try_format(&Local::now(), &self.format).is_err() {
            bail!("invalid date format `{}`", self.format);
        }
        Ok(())
    }

    fn execute(&mut self, path: &Path) -> Result<Value> {
        if !self.enabled {
            return Ok(Value::Null);
        }
        let modified = path.metadata_modified().ok_or_else(|| {
            anyhow!("failed to read the modified time of `{}`", path.display())
        })?;
        let local: DateTime<Local> = modified.into();
        Ok(Value::Str(try_format(&local, &self.format)?))
    }
}

/// Format the instant, surfacing an invalid format string as an error
/// instead of a panic.
fn try_format(instant: &DateTime<Local>, format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", instant.format(format))
        .map_err(|_| anyhow!("invalid date format `{format}`"))?;
    Ok(out)
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::fs;

    use filetime::FileTime;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn file_date_formats_modified_time() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("photo.jpg");
        fs::write(&path, b"x").unwrap();
        // 2021-05-17 12:00:00 UTC
        filetime::set_file_mtime(&path, FileTime::from_unix_time(1_621_252_800, 0)).unwrap();

        let mut analyzer = FileDate::default();
        analyzer.init().unwrap();
        let value = analyzer.execute(&path).unwrap();

        let expected: DateTime<Local> =
            DateTime::from_timestamp(1_621_252_800, 0).unwrap().into();
        assert_eq!(value, Value::Str(expected.format("%Y-%m-%d").to_string()));
    }

    #[test]
    fn file_date_disabled_is_null() {
        let table: toml::Table = toml::from_str("enabled = false").unwrap();
        let mut analyzer = FileDate::from_config(&table).unwrap();
        analyzer.init().unwrap();
        assert_eq!(analyzer.execute(Path::new("/nope")).unwrap(), Value::Null);
    }

    #[test]
    fn file_date_missing_file_is_error() {
        let mut analyzer = FileDate::default();
        assert!(analyzer.execute(Path::new("/definitely/not/a/file")).is_err());
    }
}
