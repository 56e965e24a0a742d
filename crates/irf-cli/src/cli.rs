use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "irfkit CLI - effective-area lookups and parameter-file tools for gamma-ray instrument response analysis.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Enable hardware floating-point exception traps before running.
    /// Fails on builds without trapping support.
    #[arg(long, global = true)]
    pub fpe: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up the effective area of an instrument response set.
    Aeff(AeffArgs),
    /// Inspect and edit IRAF-style .par parameter files.
    Par(ParArgs),
}

/// Arguments for the `aeff` subcommand.
#[derive(Args, Debug)]
pub struct AeffArgs {
    /// Path to the TOML manifest declaring the available response sets.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Name of the response set to query (e.g. P8R3_SOURCE_V3).
    #[arg(short, long, required = true, value_name = "NAME")]
    pub irf: String,

    /// True photon energy in MeV.
    #[arg(short, long, required = true, value_name = "MEV")]
    pub energy: f64,

    /// Inclination angle with respect to the instrument axis, in degrees.
    #[arg(short, long, required = true, value_name = "DEG")]
    pub theta: f64,

    /// Azimuth angle in degrees.
    #[arg(short, long, default_value_t = 0.0, value_name = "DEG")]
    pub phi: f64,

    /// Conversion type to query: 0 for FRONT, 1 for BACK.
    /// Both sections are reported when omitted.
    #[arg(short, long, value_name = "INT")]
    pub conversion_type: Option<i32>,
}

/// Arguments for the `par` subcommand.
#[derive(Args, Debug)]
pub struct ParArgs {
    #[command(subcommand)]
    pub command: ParCommands,

    /// Parameter-file search path, overriding the PFILES environment variable.
    /// Directories are separated by ';' or ':'.
    #[arg(long, global = true, value_name = "PATHS")]
    pub pfiles: Option<String>,
}

/// Available commands for parameter-file access.
#[derive(Subcommand, Debug)]
pub enum ParCommands {
    /// List every parameter of an application with its value and prompt.
    List {
        /// Application name; its group is read from <APP>.par.
        #[arg(required = true)]
        app: String,
    },
    /// Print the value of a single parameter.
    Get {
        #[arg(required = true)]
        app: String,
        /// Parameter name.
        #[arg(required = true)]
        name: String,
    },
    /// Update a parameter value and write the file back.
    Set {
        #[arg(required = true)]
        app: String,
        /// Assignment in NAME=VALUE form.
        #[arg(required = true, value_name = "NAME=VALUE")]
        assignment: String,
    },
}
