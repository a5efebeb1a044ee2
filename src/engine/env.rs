//! The variable environment built for a single file.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context as ResultExt, Result};
use indexmap::IndexMap;

/// The built-in variables that are available without any plugin, with their
/// descriptions.
pub const BUILTIN_VARIABLES: &[(&str, &str)] = &[
    ("filename", "full file name, including the extension"),
    ("basename", "file name without the extension"),
    ("extension", "file extension, with the leading dot"),
    ("ext", "file extension, without the leading dot"),
    ("filepath", "absolute path of the file"),
    ("dirname", "directory containing the file"),
    ("filesize", "file size in bytes"),
];

/// Returns whether the given variable is provided without any plugin.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_VARIABLES.iter().any(|(n, _)| *n == name)
}

/// The convenience aliases derived by the resolver after plugin execution.
/// They resolve even when the plugin behind them is not loaded.
pub const ALIAS_VARIABLES: &[&str] = &["groups", "primary_group", "size_category", "file_date"];

/// Returns whether the given variable is a derived alias.
pub fn is_alias(name: &str) -> bool {
    ALIAS_VARIABLES.contains(&name)
}

/// A value produced by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    List(Vec<String>),
    Null,
}

impl Value {
    /// Returns the contained list, if this value is a list.
    pub fn as_list(&self) -> Option<&Vec<String>> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// Returns the contained string, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value should be substituted in favor of a token default.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::Int(i) => *i != 0,
            Self::List(list) => !list.is_empty(),
            Self::Null => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::List(list) => f.write_str(&list.join(",")),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Self {
        Self::List(list)
    }
}

/// The mapping from variable names to values used by one render.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: IndexMap<String, Value>,
}

impl Env {
    /// Build the built-in entries for a file from a single stat.
    pub fn for_file(path: &Path) -> Result<Self> {
        let metadata =
            fs::metadata(path).with_context(s!("failed to stat `{}`", path.display()))?;

        let filepath = if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir()
                .context("failed to determine the current directory")?
                .join(path)
        };

        let filename = filepath
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let basename = filepath
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = filepath
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = if ext.is_empty() {
            String::new()
        } else {
            format!(".{ext}")
        };
        let dirname = filepath
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let mut vars = IndexMap::new();
        vars.insert("filename".to_string(), Value::Str(filename));
        vars.insert("basename".to_string(), Value::Str(basename));
        vars.insert("extension".to_string(), Value::Str(extension));
        vars.insert("ext".to_string(), Value::Str(ext));
        vars.insert(
            "filepath".to_string(),
            Value::Str(filepath.display().to_string()),
        );
        vars.insert("dirname".to_string(), Value::Str(dirname));
        vars.insert("filesize".to_string(), Value::Int(metadata.len() as i64));

        Ok(Self { vars })
    }

    /// Store a plugin result under the plugin's name.
    pub fn insert(&mut self, name: String, value: Value) {
        self.vars.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Derive the convenience aliases from the plugin results. Aliases never
    /// overwrite an entry that a plugin already provided.
    pub fn apply_aliases(&mut self) {
        let groups = match self.vars.get("manual_grouping") {
            Some(Value::List(list)) => list.clone(),
            _ => Vec::new(),
        };
        let primary_group = groups
            .first()
            .cloned()
            .unwrap_or_else(|| "Others".to_string());
        let size_category = self
            .vars
            .get("file_size_classifier")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let file_date = self
            .vars
            .get("file_date_read")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        for (name, value) in [
            ("groups", Value::List(groups)),
            ("primary_group", Value::Str(primary_group)),
            ("size_category", Value::Str(size_category)),
            ("file_date", Value::Str(file_date)),
        ] {
            if !self.vars.contains_key(name) {
                self.vars.insert(name.to_string(), value);
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn env_for_file_builtins() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("Report.tar.gz");
        fs::write(&path, b"hello").unwrap();

        let env = Env::for_file(&path).unwrap();

        assert_eq!(env.get("filename").unwrap(), &Value::from("Report.tar.gz"));
        assert_eq!(env.get("basename").unwrap(), &Value::from("Report.tar"));
        assert_eq!(env.get("extension").unwrap(), &Value::from(".gz"));
        assert_eq!(env.get("ext").unwrap(), &Value::from("gz"));
        assert_eq!(env.get("filesize").unwrap(), &Value::Int(5));
        assert_eq!(
            env.get("filepath").unwrap(),
            &Value::from(path.display().to_string())
        );
        assert_eq!(
            env.get("dirname").unwrap(),
            &Value::from(temp.path().display().to_string())
        );
    }

    #[test]
    fn env_for_file_no_extension() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("README");
        fs::write(&path, b"").unwrap();

        let env = Env::for_file(&path).unwrap();

        assert_eq!(env.get("basename").unwrap(), &Value::from("README"));
        assert_eq!(env.get("extension").unwrap(), &Value::from(""));
        assert_eq!(env.get("ext").unwrap(), &Value::from(""));
    }

    #[test]
    fn env_for_file_missing() {
        assert!(Env::for_file(Path::new("/definitely/not/a/file")).is_err());
    }

    #[test]
    fn env_aliases_from_grouping() {
        let mut env = Env::default();
        env.insert(
            "manual_grouping".to_string(),
            Value::from(vec!["Docs".to_string(), "Work".to_string()]),
        );
        env.apply_aliases();

        assert_eq!(
            env.get("groups").unwrap(),
            &Value::from(vec!["Docs".to_string(), "Work".to_string()])
        );
        assert_eq!(env.get("primary_group").unwrap(), &Value::from("Docs"));
        assert_eq!(env.get("size_category").unwrap(), &Value::from("unknown"));
        assert_eq!(env.get("file_date").unwrap(), &Value::from(""));
    }

    #[test]
    fn env_aliases_without_grouping() {
        let mut env = Env::default();
        env.apply_aliases();

        assert_eq!(env.get("groups").unwrap(), &Value::List(Vec::new()));
        assert_eq!(env.get("primary_group").unwrap(), &Value::from("Others"));
    }

    #[test]
    fn env_aliases_do_not_overwrite() {
        let mut env = Env::default();
        env.insert("primary_group".to_string(), Value::from("Mine"));
        env.apply_aliases();
        assert_eq!(env.get("primary_group").unwrap(), &Value::from("Mine"));
    }

    #[test]
    fn value_truthiness() {
        assert!(Value::from("x").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::Int(7).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::from(vec!["a".to_string()]).is_truthy());
        assert!(!Value::List(Vec::new()).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(
            Value::from(vec!["a".to_string(), "b".to_string()]).to_string(),
            "a,b"
        );
        assert_eq!(Value::Null.to_string(), "");
    }
}
