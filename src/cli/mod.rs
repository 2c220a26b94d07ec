//! CLI argument parsing for threadview
//!
//! Global flags: --root, --config, --format, --quiet, --verbose, plus the
//! logging switches.

pub mod args;
pub mod output;
pub mod parse;
pub mod paths;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use args::{LinksArgs, RenderArgs};
pub use output::OutputFormat;
use parse::parse_format;

/// Threadview - flatten threaded discussions into render-ready sequences
#[derive(Parser, Debug)]
#[command(name = "threadview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory searched for threadview.toml
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Explicit config file
    #[arg(long, global = true, env = "THREADVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_parser = parse_format, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Debug-level logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (overrides --verbose)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten a bundle around its pivot and print the page view
    Render(RenderArgs),

    /// List the entries of a bundle with their kind
    Links(LinksArgs),
}
