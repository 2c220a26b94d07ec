//! `threadview links` command - list the entries of a bundle

use threadview_core::bundle::ContentBundle;
use threadview_core::error::Result;

use crate::cli::{LinksArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;

/// Execute the links command
pub fn execute(ctx: &CommandContext, args: &LinksArgs) -> Result<()> {
    let (store, pivot) = ContentBundle::load(&args.bundle)?.into_store()?;
    let entries = store.entries();

    match ctx.cli.format {
        OutputFormat::Json => {
            let listed: Vec<serde_json::Value> = entries
                .iter()
                .map(|(key, kind)| {
                    serde_json::json!({
                        "id": key.as_str(),
                        "kind": kind.as_str(),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "pivot": pivot.as_ref().map(|p| p.id()),
                "count": listed.len(),
                "entries": listed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if entries.is_empty() {
                if !ctx.cli.quiet {
                    println!("No entries found");
                }
                return Ok(());
            }
            for (key, kind) in &entries {
                let marker = if pivot.as_ref().is_some_and(|p| p.id() == key.as_str()) {
                    " (pivot)"
                } else {
                    ""
                };
                println!("{:<9} {}{}", kind.as_str(), key, marker);
            }
        }
        OutputFormat::Records => {
            println!(
                "H threadview=1 records=1 mode=links count={}",
                entries.len()
            );
            for (key, kind) in &entries {
                println!("K {} {}", key, kind.as_str());
            }
        }
    }
    Ok(())
}
