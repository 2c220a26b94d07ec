//! Orchestrator: ancestors + pivot subtree + page metadata

use std::time::Instant;

use tracing::debug;

use super::ancestors::{walk_ancestors, Ancestor};
use super::replies::{emit_post, flatten_post};
use super::types::{FlatItem, FlatLoader, PageView, RenderOptions};
use super::{FlattenCtx, FlattenOptions};
use crate::collapse::CollapseRegistry;
use crate::deps::Dependencies;
use crate::error::Result;
use crate::link::Link;
use crate::model::{PageBody, Post, PostContent};
use crate::store::ContentStore;
use crate::trace_time;

/// Output of one flatten pass
#[derive(Debug, Clone)]
pub struct Flattened {
    pub view: PageView,
    /// Everything the pass read, for staleness checks
    pub deps: Dependencies,
}

/// Flatten the page centered on `pivot`.
///
/// Page ancestors are rendered in their own wrapper followed by a
/// horizontal line. The first page in the chain, which may be the pivot
/// itself, also supplies the header and sidebar.
/// Other ancestors, loader placeholders and errors share the pivot's
/// wrapper and directly precede it.
#[tracing::instrument(skip_all, fields(pivot = %pivot))]
pub fn flatten_page(
    store: &ContentStore,
    collapse: &mut CollapseRegistry,
    pivot: &Link<Post>,
    options: &FlattenOptions,
) -> Result<Flattened> {
    let start = Instant::now();
    let mut ctx = FlattenCtx::new(store, collapse, options);
    let chain = walk_ancestors(&mut ctx, pivot)?;

    let mut view = PageView::new(pivot.clone());
    let mut titles: Vec<&str> = Vec::new();
    let mut page_seen = false;
    let mut pending: Vec<FlatItem> = Vec::new();

    for ancestor in chain {
        match ancestor {
            Ancestor::Post {
                link,
                post,
                is_pivot: true,
            } => {
                titles.extend(post.content.display_title());
                if let Some(listing) = &post.replies {
                    view.sort_options = listing.sort_options.clone();
                    view.reply = listing.reply.clone();
                }
                let rpo = RenderOptions {
                    is_pivot: true,
                    at_or_above_pivot: true,
                    first_in_wrapper: pending.is_empty(),
                    ..RenderOptions::default()
                };
                flatten_post(&mut ctx, &link, &[], rpo, &mut pending)?;

                if let PostContent::Page(page) = &post.content {
                    if !page_seen {
                        page_seen = true;
                        page_slots(&mut ctx, page, &mut view)?;
                    }
                }
            }
            Ancestor::Post { link, post, .. } => {
                if post.content.is_page_like() {
                    titles.extend(post.content.display_title());
                }
                match &post.content {
                    PostContent::Page(page) => {
                        close_wrapper(&mut view.body, &mut pending);
                        let mut group = Vec::new();
                        emit_post(&mut ctx, &link, &[], above_pivot(true), &mut group)?;
                        view.body.push(FlatItem::WrapperStart);
                        view.body.append(&mut group);
                        view.body.push(FlatItem::WrapperEnd);
                        view.body.push(FlatItem::HorizontalLine);

                        if !page_seen {
                            page_seen = true;
                            page_slots(&mut ctx, page, &mut view)?;
                        }
                    }
                    _ => {
                        let rpo = above_pivot(pending.is_empty());
                        emit_post(&mut ctx, &link, &[], rpo, &mut pending)?;
                    }
                }
            }
            Ancestor::Loader(target) => pending.push(FlatItem::Loader(FlatLoader {
                target,
                indent: Vec::new(),
                depth: 0,
                at_or_above_pivot: true,
            })),
            Ancestor::Error { note, data } => pending.push(FlatItem::Error { note, data }),
        }
    }
    close_wrapper(&mut view.body, &mut pending);

    view.title = titles.join(&options.title_separator);
    let deps = ctx.into_dependencies();
    debug!(
        items = view.body.len(),
        reads = deps.len(),
        title = %view.title,
        "flatten_page"
    );
    trace_time!(start, "flatten_page");
    Ok(Flattened { view, deps })
}

fn above_pivot(first_in_wrapper: bool) -> RenderOptions {
    RenderOptions {
        at_or_above_pivot: true,
        first_in_wrapper,
        ..RenderOptions::default()
    }
}

/// Move accumulated items into `body` as one wrapper
fn close_wrapper(body: &mut Vec<FlatItem>, pending: &mut Vec<FlatItem>) {
    if pending.is_empty() {
        return;
    }
    body.push(FlatItem::WrapperStart);
    body.append(pending);
    body.push(FlatItem::WrapperEnd);
}

/// Flatten a page's header into `above_body` and its widgets into `sidebar`
fn page_slots(ctx: &mut FlattenCtx<'_>, page: &PageBody, view: &mut PageView) -> Result<()> {
    let rpo = RenderOptions {
        first_in_wrapper: true,
        ..RenderOptions::default()
    };
    if let Some(header) = &page.header {
        view.above_body.push(FlatItem::WrapperStart);
        flatten_post(ctx, header, &[], rpo, &mut view.above_body)?;
        view.above_body.push(FlatItem::WrapperEnd);
    }
    for widget in &page.sidebar {
        view.sidebar.push(FlatItem::WrapperStart);
        flatten_post(ctx, widget, &[], rpo, &mut view.sidebar)?;
        view.sidebar.push(FlatItem::WrapperEnd);
    }
    Ok(())
}
