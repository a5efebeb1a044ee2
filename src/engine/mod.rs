//! The classification engine.
//!
//! The engine ties the subsystems together for one file: parse the template,
//! load the plugins its variables need, build the variable environment, and
//! render the destination path under the output directory.

pub mod env;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::{Context as ResultExt, Result};
use indexmap::IndexMap;

use crate::config::Config;
use crate::context::Context;
use crate::engine::env::Env;
use crate::engine::template::Template;
use crate::plugin::Registry;

/// The public facade over the registry, resolver, and renderer.
pub struct Engine {
    output: PathBuf,
    template: Template,
    registry: Registry,
    /// Analysis results keyed by absolute file path, dropped whenever the
    /// loaded plugin set changes or a plugin is reloaded.
    cache: IndexMap<PathBuf, Env>,
}

impl Engine {
    /// Discover plugins and load the ones the configured template needs.
    pub fn new(ctx: &Context, config: &Config) -> Self {
        let mut registry = Registry::discover(ctx, &config.plugin_dirs);
        registry.set_active_variables(ctx, &config.template.variables());
        Self {
            output: config.output.clone(),
            template: config.template.clone(),
            registry,
            cache: IndexMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Make the given template active, adjusting the loaded plugin set.
    pub fn set_template(&mut self, ctx: &Context, template: Template) {
        if template.source() == self.template.source() {
            return;
        }
        if self.registry.set_active_variables(ctx, &template.variables()) {
            self.cache.clear();
        }
        self.template = template;
    }

    /// Analyze a file and render its destination path.
    pub fn execute(
        &mut self,
        ctx: &Context,
        path: &Path,
        template: Option<&str>,
    ) -> Result<PathBuf> {
        if let Some(source) = template {
            self.set_template(ctx, Template::parse(source));
        }
        let env = self.analyze(ctx, path)?;
        Ok(self.template.render_into(&env, &self.output))
    }

    /// Analyze each file in turn. A per-file failure is reported in place
    /// and never aborts the batch.
    pub fn batch_execute(
        &mut self,
        ctx: &Context,
        paths: &[PathBuf],
        template: Option<&str>,
    ) -> Vec<(PathBuf, Result<PathBuf>)> {
        paths
            .iter()
            .map(|path| (path.clone(), self.execute(ctx, path, template)))
            .collect()
    }

    /// Reload a plugin by name and drop any cached analysis results.
    pub fn reload(&mut self, ctx: &Context, name: &str) -> Result<()> {
        self.registry.reload(ctx, name)?;
        self.cache.clear();
        Ok(())
    }

    /// Build the environment for a single file: the built-in entries from
    /// one stat, every loaded plugin's result keyed by plugin name, then the
    /// convenience aliases. The environment is never mutated once rendering
    /// begins.
    fn analyze(&mut self, ctx: &Context, path: &Path) -> Result<Env> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("failed to determine the current directory")?
                .join(path)
        };
        if let Some(env) = self.cache.get(&path) {
            return Ok(env.clone());
        }

        let mut env = Env::for_file(&path)?;
        for name in self.registry.loaded_names() {
            let value = self.registry.invoke(ctx, &name, &path);
            env.insert(name, value);
        }
        env.apply_aliases();

        self.cache.insert(path, env.clone());
        Ok(env)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
