//! Command trait and context for dispatching commands

use std::path::Path;
use std::time::Instant;

use threadview_core::config::Config;
use threadview_core::error::Result;

use crate::cli::{Cli, Commands};
use crate::commands::{links, render};

/// Load the explicit config file, or discover one under `root`
pub fn load_config(cli: &Cli, root: &Path) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            let resolved = if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            };
            Config::load(&resolved)
        }
        None => Config::discover(root),
    }
}

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub config: Config,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, root: &Path, start: Instant) -> Result<Self> {
        let config = load_config(cli, root)?;
        Ok(Self {
            cli,
            config,
            start,
        })
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Render(args) => render::execute(ctx, args),
            Commands::Links(args) => links::execute(ctx, args),
        }
    }
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("threadview {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Flattens threaded discussions into collapsible, render-ready sequences.");
        println!();
        println!("Run `threadview --help` for usage information.");
        Ok(())
    }
}
