//! Command line interface.

mod color_choice;
mod raw;


use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::anyhow;
use clap::{CommandFactory, Parser};
use clap_complete as complete;

use crate::cli::raw::{RawCommand, RawOpt};
use crate::context::{log_error, Context, Output, Verbosity};
use crate::util::build;

/// Parse the command line arguments.
///
/// In the event of failure it will print the error message and quit the
/// program without returning.
pub fn from_args() -> Opt {
    Opt::from_raw_opt(RawOpt::parse())
}

/// Resolved command line options with defaults set.
#[derive(Debug)]
pub struct Opt {
    /// Global context for use across the entire program.
    pub ctx: Context,
    /// The subcommand.
    pub command: Command,
}

/// The resolved command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Initialize a new config file.
    Init { output: Option<PathBuf> },
    /// Show the active template, discovered plugins, and their variables.
    Status,
    /// Print the active template.
    TemplateGet,
    /// Replace the active template in the config file.
    TemplateSet { template: String },
    /// Render destination paths without copying anything.
    Preview {
        files: Vec<PathBuf>,
        template: Option<String>,
    },
    /// Classify the given files and copy them into the output directory.
    Sort {
        files: Vec<PathBuf>,
        template: Option<String>,
        dry_run: bool,
    },
    /// Reload a plugin by name.
    Reload { name: String },
}

impl Opt {
    fn from_raw_opt(raw_opt: RawOpt) -> Self {
        let RawOpt {
            quiet,
            non_interactive,
            verbose,
            color,
            home,
            config_dir,
            config_file,
            plugin_dir,
            command,
        } = raw_opt;

        let command = match command {
            RawCommand::Init { output } => Command::Init { output },
            RawCommand::Status => Command::Status,
            RawCommand::Template { template } => match template {
                Some(template) => Command::TemplateSet { template },
                None => Command::TemplateGet,
            },
            RawCommand::Preview { files, template } => Command::Preview { files, template },
            RawCommand::Sort {
                files,
                template,
                dry_run,
            } => Command::Sort {
                files,
                template,
                dry_run,
            },
            RawCommand::Reload { name } => Command::Reload { name },
            RawCommand::Completions { shell } => {
                let mut app = RawOpt::command();
                complete::generate(shell, &mut app, build::CRATE_NAME, &mut io::stdout());
                process::exit(0);
            }
            RawCommand::Version => {
                println!("{} {}", build::CRATE_NAME, &*build::CRATE_VERBOSE_VERSION);
                process::exit(0);
            }
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        let output = Output {
            verbosity,
            no_color: color.is_no_color(),
        };

        let home = match home.or_else(home::home_dir).ok_or_else(|| {
            anyhow!(
                "failed to determine the current user's home directory, try using the `--home` \
                 option"
            )
        }) {
            Ok(home) => home,
            Err(err) => {
                log_error(output.no_color, &err);
                process::exit(1);
            }
        };

        let xdg_config_user = env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);

        // Note: `XDG_RUNTIME_DIR` is not checked as it can be set by the
        // system rather than the user, and cannot be relied upon to indicate
        // a preference for XDG directory layout.
        let using_xdg = any!(
            xdg_config_user,
            env::var_os("XDG_CACHE_HOME"),
            env::var_os("XDG_DATA_HOME"),
            env::var_os("XDG_DATA_DIRS"),
            env::var_os("XDG_CONFIG_DIRS")
        );

        let config_pre = if using_xdg {
            xdg_config_user
                .unwrap_or_else(|| home.join(".config"))
                .join("curator")
        } else {
            home.join(".curator")
        };

        let config_dir = config_dir.unwrap_or(config_pre);
        let config_file = config_file.unwrap_or_else(|| config_dir.join("curator.toml"));
        let plugin_dir = plugin_dir.unwrap_or_else(|| config_dir.join("plugins"));

        let ctx = Context {
            home,
            config_dir,
            config_file,
            plugin_dir,
            interactive: !non_interactive,
            output,
        };

        Self { ctx, command }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
impl Opt {
    fn try_parse_from<I>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = &'static str>,
    {
        Ok(Self::from_raw_opt(RawOpt::try_parse_from(iter)?))
    }
}
