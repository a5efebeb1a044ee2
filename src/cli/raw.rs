#![deny(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete as complete;

use crate::cli::color_choice::ColorChoice;
use crate::util::build;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
{author}
{about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, PartialEq, Eq, Parser)]
#[clap(
    author,
    version = build::CRATE_RELEASE,
    long_version = build::CRATE_LONG_VERSION.as_str(),
    about,
    long_about = None,
    help_template = HELP_TEMPLATE,
    disable_help_subcommand(true),
    subcommand_required(true),
)]
pub struct RawOpt {
    /// Suppress any informational output.
    #[clap(long, short)]
    pub quiet: bool,

    /// Suppress any interactive prompts and assume "yes" as the answer.
    #[clap(long)]
    pub non_interactive: bool,

    /// Use verbose output.
    #[clap(long, short)]
    pub verbose: bool,

    /// Output coloring: always, auto, or never.
    #[clap(long, value_name = "WHEN", default_value_t)]
    pub color: ColorChoice,

    /// The home directory.
    #[clap(long, value_name = "PATH", hide(true))]
    pub home: Option<PathBuf>,

    /// The configuration directory.
    #[clap(long, value_name = "PATH", env = "CURATOR_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// The config file.
    #[clap(long, value_name = "PATH", env = "CURATOR_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// The default plugin directory.
    #[clap(long, value_name = "PATH", env = "CURATOR_PLUGIN_DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// The subcommand to run.
    #[clap(subcommand)]
    pub command: RawCommand,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum RawCommand {
    /// Initialize a new config file.
    Init {
        /// The output directory to classify files into.
        #[clap(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show the active template, the discovered plugins, and their
    /// variables.
    Status,

    /// Print the active template, or replace it.
    Template {
        /// The new template; the current one is printed when omitted.
        #[clap(value_name = "TEMPLATE")]
        template: Option<String>,
    },

    /// Render destination paths without copying anything.
    Preview {
        /// The files to classify.
        #[clap(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Override the configured template for this run.
        #[clap(long, value_name = "TEMPLATE")]
        template: Option<String>,
    },

    /// Classify the given files and copy them into the output directory.
    Sort {
        /// The files to classify and copy.
        #[clap(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Override the configured template for this run.
        #[clap(long, value_name = "TEMPLATE")]
        template: Option<String>,

        /// Analyze and render only, do not copy anything.
        #[clap(long)]
        dry_run: bool,
    },

    /// Reload a plugin that is loaded for the active template.
    Reload {
        /// The name of the plugin.
        #[clap(value_name = "NAME")]
        name: String,
    },

    /// Generate completions for the given shell.
    Completions {
        /// The type of shell.
        #[clap(long, value_name = "SHELL")]
        shell: complete::Shell,
    },

    /// Prints detailed version information.
    Version,
}
