//! `threadview render` command - flatten a bundle and print the page view
//!
//! - `render <bundle>` renders around the bundle's declared pivot
//! - `--collapse/--expand` force collapse flags before the first pass
//! - `--sources DIR` answers visible loaders from `DIR/<key>.json`

mod human;
mod json;
mod records;

use threadview_core::bundle::ContentBundle;
use threadview_core::error::{Result, ThreadError};
use threadview_core::link::Link;
use threadview_core::model::{Post, PostContent};
use threadview_core::session::Session;
use threadview_core::source::{ContentSource, DirectorySource};
use tracing::{debug, warn};

use crate::cli::{OutputFormat, RenderArgs};
use crate::commands::dispatch::CommandContext;

/// Execute the render command
pub fn execute(ctx: &CommandContext, args: &RenderArgs) -> Result<()> {
    let (store, declared) = ContentBundle::load(&args.bundle)?.into_store()?;
    let pivot: Link<Post> = match (&args.pivot, declared) {
        (Some(id), _) => Link::new(id.as_str()),
        (None, Some(pivot)) => pivot,
        (None, None) => {
            return Err(ThreadError::UsageError(format!(
                "{} declares no pivot; pass --pivot <ID>",
                args.bundle.display()
            )))
        }
    };

    let mut session = Session::from_config(store, pivot, &ctx.config);
    if args.no_threading {
        session.set_threading(false);
    }
    for id in &args.collapse {
        session.set_collapsed(&Link::new(id.as_str()), true);
    }
    for id in &args.expand {
        session.set_collapsed(&Link::new(id.as_str()), false);
    }

    let rounds = args.load_rounds.unwrap_or(ctx.config.loader.max_rounds);
    match &args.sources {
        Some(dir) => {
            let loaded = expand_loaders(&mut session, &DirectorySource::new(dir), rounds)?;
            debug!(loaded, rounds, "expand_loaders");
        }
        None if rounds > 0 => debug!(rounds, "no --sources given, loaders left pending"),
        None => {}
    }

    let view = session.view()?;
    match ctx.cli.format {
        OutputFormat::Human => human::print(view, ctx.cli.quiet),
        OutputFormat::Json => json::print(view)?,
        OutputFormat::Records => records::print(view),
    }

    debug!(
        elapsed = ?ctx.start.elapsed(),
        recomputes = session.recompute_count(),
        "render"
    );
    Ok(())
}

/// Answer visible loaders for up to `rounds` rounds, returning how many
/// entries were merged.
///
/// A loader with no bundle behind it stays pending; any other source
/// failure aborts.
fn expand_loaders(
    session: &mut Session,
    source: &dyn ContentSource,
    rounds: u32,
) -> Result<usize> {
    let mut loaded = 0;
    for round in 0..rounds {
        let loaders = session.visible_loaders()?;
        if loaders.is_empty() {
            break;
        }
        let mut progressed = false;
        for loader in &loaders {
            match session.load_more(loader, source) {
                Ok(report) => {
                    progressed |= report.added > 0;
                    loaded += report.added;
                }
                Err(ThreadError::NotFound { value, .. }) => {
                    warn!(key = %loader.key, bundle = %value, "loader has no bundle");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(round, loaders = loaders.len(), progressed, "load_round");
        if !progressed {
            break;
        }
    }
    Ok(loaded)
}

/// One-line label for a post's content
fn label(content: &PostContent) -> String {
    match content {
        PostContent::Page(page) => format!("# {}", page.title),
        PostContent::Client(client) => format!("@{}", client.name),
        PostContent::Post(body) => match (&body.title, body.body.lines().next()) {
            (Some(title), _) => title.clone(),
            (None, Some(first)) if !first.is_empty() => first.to_string(),
            _ => "(untitled)".to_string(),
        },
        PostContent::Legacy(legacy) => format!("({})", legacy.note),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadview_core::model::PostBody;

    #[test]
    fn test_label_prefers_title_then_body() {
        assert_eq!(label(&PostContent::post("Hello")), "Hello");
        let body_only = PostContent::Post(PostBody {
            body: "first line\nsecond".into(),
            ..PostBody::default()
        });
        assert_eq!(label(&body_only), "first line");
        assert_eq!(label(&PostContent::Post(PostBody::default())), "(untitled)");
        assert_eq!(label(&PostContent::page("Front")), "# Front");
    }
}
