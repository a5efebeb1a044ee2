#[macro_use]
mod macros;
mod cli;
mod config;
mod context;
mod copy;
mod engine;
mod plugin;
mod util;

use std::fs;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context as ResultExt, Error, Result};

use crate::cli::{Command, Opt};
use crate::config::{Config, EditConfig};
use crate::context::Context;
use crate::copy::CopyTask;
use crate::engine::env;
use crate::engine::template::Template;
use crate::engine::Engine;
use crate::plugin::Registry;
use crate::util::{build, underlying_io_error_kind};

fn main() {
    let res = panic::catch_unwind(|| {
        let Opt { ctx, command } = cli::from_args();
        if let Err(err) = run_command(&ctx, command) {
            ctx.log_error(&err);
            process::exit(2);
        }
    });
    if res.is_err() {
        eprintln!(
            "\nThis is probably a bug, please file an issue at \
             https://github.com/curator-tools/curator/issues."
        );
        process::exit(127);
    }
}

/// The main entry point to execute the application.
fn run_command(ctx: &Context, command: Command) -> Result<()> {
    // We always try to acquire the mutex but it is only strictly necessary
    // for the command that rewrites the config file.
    let _guard = match acquire_mutex(ctx, ctx.config_dir()) {
        Ok(g) => Some(g),
        Err(_) if !matches!(command, Command::TemplateSet { .. }) => None,
        Err(err) => {
            return Err(err).context("failed to acquire lock on config directory");
        }
    };
    match command {
        Command::Init { output } => init(ctx, output.as_deref()),
        Command::Status => status(ctx),
        Command::TemplateGet => template_get(ctx),
        Command::TemplateSet { template } => template_set(ctx, &template),
        Command::Preview { files, template } => preview(ctx, &files, template.as_deref()),
        Command::Sort {
            files,
            template,
            dry_run,
        } => sort(ctx, &files, template.as_deref(), dry_run),
        Command::Reload { name } => reload(ctx, &name),
    }
}

fn acquire_mutex(ctx: &Context, path: &Path) -> Result<fmutex::Guard> {
    match fmutex::try_lock(path).with_context(s!("failed to open `{}`", path.display()))? {
        Some(g) => Ok(g),
        None => {
            warning!(
                ctx,
                "Blocking",
                &format!("waiting for file lock on {}", ctx.pretty_path(path))
            );
            fmutex::lock(path)
                .with_context(s!("failed to acquire file lock `{}`", path.display()))
        }
    }
}

/// Load the config file and log any non-fatal problems as warnings.
fn load_config(ctx: &Context) -> Result<Config> {
    let path = ctx.config_file();
    let mut warnings = Vec::new();
    let config =
        config::from_path(ctx, path, &mut warnings).context("failed to load config file")?;
    header!(ctx, "Loaded", ctx.pretty_path(path));
    for err in &warnings {
        ctx.log_error_as_warning(err);
    }
    Ok(config)
}

/// Executes the `init` subcommand.
///
/// Initialize a new config file.
fn init(ctx: &Context, output: Option<&Path>) -> Result<()> {
    let path = ctx.config_file();
    match path
        .metadata()
        .with_context(s!("failed to check `{}`", path.display()))
    {
        Ok(_) => {
            header!(ctx, "Already initialized", ctx.pretty_path(path));
        }
        Err(err) => {
            init_config(ctx, path, output, err)?.to_path(path)?;
            header!(ctx, "Initialized", ctx.pretty_path(path));
        }
    }
    Ok(())
}

/// Generic function to initialize the config file.
fn init_config(
    ctx: &Context,
    path: &Path,
    output: Option<&Path>,
    err: Error,
) -> Result<EditConfig> {
    if underlying_io_error_kind(&err) == Some(io::ErrorKind::NotFound) {
        if ctx.interactive
            && !casual::confirm(format!(
                "Initialize new config file `{}`?",
                ctx.pretty_path(path)
            ))
        {
            bail!("aborted initialization!");
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(s!(
                "failed to create directory `{}`",
                ctx.pretty_path(parent)
            ))?;
        }
        Ok(EditConfig::default(output))
    } else {
        Err(err)
    }
}

/// Executes the `status` subcommand.
///
/// Show the active template, the discovered plugins, and their variables.
fn status(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let engine = Engine::new(ctx, &config);
    let registry = engine.registry();
    let active = engine.template().variables();

    println!("{}", build::CRATE_NAME_RELEASE);
    println!();
    println!("output = {}", ctx.pretty_path(&config.output));
    println!("template = {}", engine.template());
    println!();
    println!("built-in variables:");
    for (name, description) in env::BUILTIN_VARIABLES {
        println!("  {name: <12} {description}");
    }
    println!();
    if registry.descriptors().next().is_none() {
        println!("no plugins discovered");
        return Ok(());
    }
    println!("plugins:");
    for descriptor in registry.descriptors() {
        let state = if registry.is_degraded(&descriptor.name) {
            " (degraded)"
        } else if registry.is_loaded(&descriptor.name) {
            " (loaded)"
        } else {
            ""
        };
        if descriptor.description.is_empty() {
            println!("  {} ({}){state}", descriptor.name, descriptor.kind);
        } else {
            println!(
                "  {} ({}){state} - {}",
                descriptor.name, descriptor.kind, descriptor.description
            );
        }
        for variable in &descriptor.variables {
            let marker = if active.contains(&variable.name) { "*" } else { " " };
            match &variable.description {
                Some(description) => {
                    println!("   {marker}{name: <12} {description}", name = variable.name);
                }
                None => println!("   {marker}{}", variable.name),
            }
        }
    }
    Ok(())
}

/// Executes the `template` subcommand without an argument.
///
/// Print the active template.
fn template_get(ctx: &Context) -> Result<()> {
    let config = EditConfig::from_path(ctx.config_file())?;
    println!("{}", config.template().unwrap_or(config::DEFAULT_TEMPLATE));
    Ok(())
}

/// Executes the `template` subcommand with an argument.
///
/// Replace the template in the config file.
fn template_set(ctx: &Context, template: &str) -> Result<()> {
    let path = ctx.config_file();
    let mut config = EditConfig::from_path(path)?;

    // Warn about variables that nothing provides; the template is still
    // accepted, unresolved tokens stay literal at render time.
    if let Ok(normalized) = config::from_path(ctx, path, &mut Vec::new()) {
        let registry = Registry::discover(ctx, &normalized.plugin_dirs);
        for variable in Template::parse(template).variables() {
            let known = env::is_builtin(&variable)
                || env::is_alias(&variable)
                || registry
                    .descriptors()
                    .any(|d| d.variables.iter().any(|v| v.name == variable));
            if !known {
                warning!(
                    ctx,
                    "Unknown",
                    &format!("no discovered plugin provides `{variable}`")
                );
            }
        }
    }

    config.set_template(template);
    config.to_path(path)?;
    header!(ctx, "Updated", ctx.pretty_path(path));
    Ok(())
}

/// Executes the `preview` subcommand.
///
/// Render destination paths without copying anything.
fn preview(ctx: &Context, files: &[PathBuf], template: Option<&str>) -> Result<()> {
    let config = load_config(ctx)?;
    let mut engine = Engine::new(ctx, &config);

    let mut errors = Vec::new();
    for (source, result) in engine.batch_execute(ctx, files, template) {
        match result {
            Ok(destination) => println!("{} -> {}", source.display(), destination.display()),
            Err(err) => {
                errors.push(err.context(format!("failed to classify `{}`", source.display())));
            }
        }
    }
    finish(ctx, errors)
}

/// Executes the `sort` subcommand.
///
/// Classify the given files and copy them into the output directory.
fn sort(ctx: &Context, files: &[PathBuf], template: Option<&str>, dry_run: bool) -> Result<()> {
    let config = load_config(ctx)?;
    let mut engine = Engine::new(ctx, &config);

    let mut errors = Vec::new();
    for (source, result) in engine.batch_execute(ctx, files, template) {
        let destination = match result {
            Ok(destination) => destination,
            Err(err) => {
                errors.push(err.context(format!("failed to classify `{}`", source.display())));
                continue;
            }
        };
        if dry_run {
            println!("{} -> {}", source.display(), destination.display());
            continue;
        }
        let task = CopyTask::new(source.clone(), vec![destination])
            .algorithm(config.hash)
            .chunk_size(config.chunk_size)
            .workers(config.workers);
        for report in task.run(ctx) {
            if let Err(err) = report.result {
                let kind = err.kind();
                errors.push(Error::new(err).context(format!(
                    "failed to copy `{}` to `{}` [{kind}]",
                    source.display(),
                    report.destination.display()
                )));
            }
        }
    }
    finish(ctx, errors)
}

/// Executes the `reload` subcommand.
///
/// Reload a plugin that is loaded for the active template.
fn reload(ctx: &Context, name: &str) -> Result<()> {
    let config = load_config(ctx)?;
    let mut engine = Engine::new(ctx, &config);
    engine.reload(ctx, name)?;
    status!(ctx, "Reloaded", &name);
    Ok(())
}

/// Log all but the last error and return the last one, so that a batch
/// failure produces a non-zero exit without aborting the other files.
fn finish(ctx: &Context, mut errors: Vec<Error>) -> Result<()> {
    match errors.pop() {
        Some(last) => {
            for err in &errors {
                ctx.log_error(err);
            }
            Err(last)
        }
        None => Ok(()),
    }
}
