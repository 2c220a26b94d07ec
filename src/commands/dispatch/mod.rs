//! Command dispatch logic for threadview

use std::time::Instant;

use threadview_core::error::Result;
use tracing::debug;

use crate::cli::paths::resolve_root_path;
use crate::cli::Cli;

mod command;

pub use command::CommandContext;
use command::{Command, NoCommand};

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let root = resolve_root_path(cli.root.clone());
    let ctx = CommandContext::new(cli, &root, start)?;

    debug!(elapsed = ?start.elapsed(), root = %root.display(), "load_config");

    match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    }
}
