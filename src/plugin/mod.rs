//! Analyzer plugins.
//!
//! The registry keeps a catalog of discovered plugin units and the subset
//! that is currently loaded. Loading is driven entirely by the variable set
//! of the active template: a plugin is loaded when one of its declared
//! variables is referenced, and unloaded when none are.
//!
//! Per plugin the lifecycle is `Discovered -> Loaded <-> Unloaded`, where a
//! load constructs the analyzer from its manifest and runs `init`, an unload
//! runs `delete`, and a reload is an unload followed by a fresh load from
//! the manifest on disk.

pub mod builtin;
mod manifest;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use indexmap::{IndexMap, IndexSet};

use crate::context::Context;
use crate::engine::env::Value;
pub use crate::plugin::manifest::{find_units, Kind, Manifest, Unit, VariableSpec};

/// An analyzer produces a variable value for a file.
///
/// `init` is called exactly once per live load and `delete` exactly once per
/// live unload. `execute` failures are isolated by the registry.
pub trait Analyzer: Send {
    /// Called once after construction.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Analyze the file at the given absolute path.
    fn execute(&mut self, path: &Path) -> Result<Value>;

    /// Called once before the plugin is dropped.
    fn delete(&mut self) {}
}

/// Metadata about a discovered plugin, read without constructing it.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: String,
    pub path: PathBuf,
    pub description: String,
    pub kind: Kind,
    pub variables: Vec<VariableSpec>,
}

impl Descriptor {
    /// Whether this plugin declares any of the given variables.
    fn provides_any(&self, vars: &IndexSet<String>) -> bool {
        self.variables.iter().any(|v| vars.contains(&v.name))
    }
}

struct Loaded {
    analyzer: Option<Box<dyn Analyzer>>,
    degraded: bool,
}

/// The catalog of discovered plugins and the subset currently loaded.
#[derive(Default)]
pub struct Registry {
    catalog: IndexMap<String, Descriptor>,
    loaded: IndexMap<String, Loaded>,
}

impl Registry {
    /// Scan the given directories for plugin units and read their metadata.
    /// No analyzer is constructed and no `init` runs.
    ///
    /// A unit whose manifest fails to parse is omitted, as is a unit that
    /// declares a variable already provided by an earlier unit.
    pub fn discover(ctx: &Context, dirs: &[PathBuf]) -> Self {
        let mut catalog: IndexMap<String, Descriptor> = IndexMap::new();
        // variable name -> providing plugin
        let mut providers: IndexMap<String, String> = IndexMap::new();

        for dir in dirs {
            if !dir.is_dir() {
                continue;
            }
            for unit in manifest::find_units(dir) {
                if catalog.contains_key(&unit.name) {
                    warning!(
                        ctx,
                        "Skipped",
                        &format!("plugin `{}` is already discovered", unit.name)
                    );
                    continue;
                }
                let manifest = match Manifest::from_path(&unit.path) {
                    Ok(manifest) => manifest,
                    Err(err) => {
                        warning!(
                            ctx,
                            "Skipped",
                            &format!("failed to discover plugin `{}`: {err:#}", unit.name)
                        );
                        continue;
                    }
                };

                let mut variables = manifest.variables;
                if variables.is_empty() {
                    // An undeclared plugin provides a single variable named
                    // after itself.
                    variables.push(VariableSpec {
                        name: unit.name.clone(),
                        description: manifest.description.clone(),
                    });
                }

                let duplicate = variables
                    .iter()
                    .find_map(|v| providers.get(&v.name).map(|p| (v.name.clone(), p.clone())));
                if let Some((variable, other)) = duplicate {
                    warning!(
                        ctx,
                        "Skipped",
                        &format!(
                            "plugin `{}`: variable `{variable}` is already provided by `{other}`",
                            unit.name
                        )
                    );
                    continue;
                }

                for variable in &variables {
                    providers.insert(variable.name.clone(), unit.name.clone());
                }
                status_v!(ctx, "Discovered", &unit.name);
                catalog.insert(
                    unit.name.clone(),
                    Descriptor {
                        name: unit.name,
                        path: unit.path,
                        description: manifest.description.unwrap_or_default(),
                        kind: manifest.kind,
                        variables,
                    },
                );
            }
        }

        Self {
            catalog,
            loaded: IndexMap::new(),
        }
    }

    /// The discovered plugins, in discovery order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.catalog.values()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    pub fn is_degraded(&self, name: &str) -> bool {
        self.loaded.get(name).map_or(false, |l| l.degraded)
    }

    /// The names of the currently loaded plugins.
    pub fn loaded_names(&self) -> Vec<String> {
        self.loaded.keys().cloned().collect()
    }

    /// Adjust the loaded set for the given active variables: unload the
    /// loaded plugins that no longer contribute any variable, then load the
    /// ones that do. Calling this twice with the same set is a no-op.
    ///
    /// Returns whether the loaded set changed.
    pub fn set_active_variables(&mut self, ctx: &Context, vars: &IndexSet<String>) -> bool {
        let to_unload: Vec<String> = self
            .loaded
            .keys()
            .filter(|name| {
                !self
                    .catalog
                    .get(*name)
                    .map_or(false, |d| d.provides_any(vars))
            })
            .cloned()
            .collect();
        let to_load: Vec<String> = self
            .catalog
            .values()
            .filter(|d| d.provides_any(vars) && !self.loaded.contains_key(&d.name))
            .map(|d| d.name.clone())
            .collect();

        let changed = !to_unload.is_empty() || !to_load.is_empty();
        for name in to_unload {
            self.unload(ctx, &name);
        }
        for name in to_load {
            self.load(ctx, &name);
        }
        changed
    }

    /// Reload a loaded plugin: `delete`, construct fresh from the manifest
    /// on disk, `init`. Fails when the plugin is not loaded.
    pub fn reload(&mut self, ctx: &Context, name: &str) -> Result<()> {
        if !self.loaded.contains_key(name) {
            bail!("plugin `{name}` is not loaded");
        }
        self.unload(ctx, name);
        self.load(ctx, name);
        Ok(())
    }

    /// Invoke a plugin's analyzer on a file. Failures are isolated: the
    /// result is `Null` and the file is still processed.
    pub fn invoke(&mut self, ctx: &Context, name: &str, path: &Path) -> Value {
        let analyzer = match self.loaded.get_mut(name) {
            Some(loaded) => match loaded.analyzer.as_mut() {
                Some(analyzer) => analyzer,
                None => return Value::Null,
            },
            None => return Value::Null,
        };
        match analyzer.execute(path) {
            Ok(value) => value,
            Err(err) => {
                warning_v!(ctx, "Failed", &format!("plugin `{name}`: {err:#}"));
                Value::Null
            }
        }
    }

    fn load(&mut self, ctx: &Context, name: &str) {
        let descriptor = match self.catalog.get(name) {
            Some(descriptor) => descriptor,
            None => return,
        };
        // The manifest is re-read so that a reload picks up on-disk changes.
        let loaded = match Manifest::from_path(&descriptor.path)
            .and_then(|manifest| builtin::construct(manifest.kind, &manifest.config))
        {
            Ok(mut analyzer) => match analyzer.init() {
                Ok(()) => {
                    status_v!(ctx, "Loaded", &name);
                    Loaded {
                        analyzer: Some(analyzer),
                        degraded: false,
                    }
                }
                Err(err) => {
                    warning!(
                        ctx,
                        "Degraded",
                        &format!("plugin `{name}` failed to initialize: {err:#}")
                    );
                    Loaded {
                        analyzer: Some(analyzer),
                        degraded: true,
                    }
                }
            },
            Err(err) => {
                warning!(
                    ctx,
                    "Degraded",
                    &format!("plugin `{name}` failed to load: {err:#}")
                );
                Loaded {
                    analyzer: None,
                    degraded: true,
                }
            }
        };
        self.loaded.insert(name.to_string(), loaded);
    }

    fn unload(&mut self, ctx: &Context, name: &str) {
        if let Some(mut loaded) = self.loaded.shift_remove(name) {
            if let Some(analyzer) = loaded.analyzer.as_mut() {
                analyzer.delete();
            }
            status_v!(ctx, "Unloaded", &name);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
