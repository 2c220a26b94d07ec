//! Reply flattener: depth-first walk of a post's replies

use std::collections::HashSet;

use tracing::trace;

use super::types::{CollapseButton, FlatItem, FlatLoader, FlatPost, LoadTarget, RenderOptions};
use super::FlattenCtx;
use crate::error::Result;
use crate::link::{Link, LinkKey};
use crate::model::{Listing, Loader, Post, PostContent, ReplyDisplay, ReplyRef};
use crate::store::Resolution;

/// A reply after loaded sequences have been merged in
enum Child {
    Post(Link<Post>),
    Loader(Loader),
    Error { note: String, data: String },
}

/// Reply count seen by the one-level threading peek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyCount {
    Zero,
    One,
    Many,
    Unknown,
}

enum Shown<'a> {
    Content(&'a PostContent),
    Unsupported(&'a str),
}

/// A post item that was just pushed, with what its replies need
pub(super) struct Emitted<'a> {
    pub post: &'a Post,
    pub indent: Vec<CollapseButton>,
    pub slot: Option<CollapseButton>,
    pub collapsed: bool,
}

/// Unwrap one level of legacy indirection
fn unwrap_special(content: &PostContent) -> Shown<'_> {
    match content {
        PostContent::Legacy(legacy) => match legacy.fallback.as_deref() {
            Some(PostContent::Legacy(_)) | None => Shown::Unsupported(&legacy.note),
            Some(fallback) => Shown::Content(fallback),
        },
        other => Shown::Content(other),
    }
}

/// Indent stack as displayed: a threaded post turns its last slot into a joining line
pub(super) fn threaded_indent(indent: &[CollapseButton], threaded: bool) -> Vec<CollapseButton> {
    let mut shown = indent.to_vec();
    if threaded {
        if let Some(last) = shown.last_mut() {
            last.threaded = true;
        }
    }
    shown
}

/// Push the item for a single post without descending into its replies.
///
/// Unresolved links become loader items and failed links become error
/// items; both return `None`.
pub(super) fn emit_post<'a>(
    ctx: &mut FlattenCtx<'a>,
    link: &Link<Post>,
    indent: &[CollapseButton],
    rpo: RenderOptions,
    out: &mut Vec<FlatItem>,
) -> Result<Option<Emitted<'a>>> {
    let post = match ctx.resolve(link) {
        Resolution::Value(post) => post,
        Resolution::Error(note) => {
            out.push(FlatItem::error(note, link.id()));
            return Ok(None);
        }
        Resolution::Unresolved => {
            out.push(FlatItem::Loader(FlatLoader {
                target: LoadTarget::Link(link.clone()),
                indent: indent.to_vec(),
                depth: rpo.depth,
                at_or_above_pivot: rpo.at_or_above_pivot,
            }));
            return Ok(None);
        }
    };

    let content = match unwrap_special(&post.content) {
        Shown::Content(content) => content,
        Shown::Unsupported(note) => {
            out.push(FlatItem::Todo {
                note: note.to_string(),
                data: link.id().to_string(),
            });
            return Ok(None);
        }
    };

    let indent = threaded_indent(indent, rpo.threaded);
    let (slot, collapsed) = match content.collapsible().default_collapsed(rpo.is_pivot) {
        Some(default) => {
            let state = ctx.collapse_state(link, Some(default))?;
            let button = CollapseButton {
                id: link.clone(),
                threaded: rpo.threaded,
                collapsed: state.collapsed,
            };
            (Some(button), state.collapsed)
        }
        None => (None, false),
    };

    out.push(FlatItem::Post(FlatPost {
        id: link.clone(),
        content: content.clone(),
        url: post.url.clone(),
        client_id: post.client_id.clone(),
        indent: indent.clone(),
        collapse: slot.clone(),
        first_in_wrapper: rpo.first_in_wrapper,
        is_pivot: rpo.is_pivot,
        at_or_above_pivot: rpo.at_or_above_pivot,
        threaded: rpo.threaded,
        depth: rpo.depth,
    }));

    Ok(Some(Emitted {
        post,
        indent,
        slot,
        collapsed,
    }))
}

/// Flatten a post and, unless it is collapsed, its whole reply subtree
pub(super) fn flatten_post(
    ctx: &mut FlattenCtx<'_>,
    link: &Link<Post>,
    indent: &[CollapseButton],
    rpo: RenderOptions,
    out: &mut Vec<FlatItem>,
) -> Result<()> {
    let Some(emitted) = emit_post(ctx, link, indent, rpo, out)? else {
        return Ok(());
    };

    // Inside a threaded chain the collapse control belongs to the chain head
    if emitted.collapsed && !rpo.threaded {
        trace!(link = %link, "collapsed_skip_replies");
        return Ok(());
    }

    match emitted.post.replies.as_ref() {
        Some(listing) => flatten_listing(ctx, listing, &emitted, rpo, out),
        None => Ok(()),
    }
}

fn flatten_listing(
    ctx: &mut FlattenCtx<'_>,
    listing: &Listing,
    parent: &Emitted<'_>,
    rpo: RenderOptions,
    out: &mut Vec<FlatItem>,
) -> Result<()> {
    let children = collect_replies(ctx, listing);
    if children.is_empty() {
        return Ok(());
    }

    let replies_threaded = listing.display == ReplyDisplay::Tree
        && ctx.options().threading
        && continues_thread(ctx, &children, rpo.threaded);

    let mut child_indent = parent.indent.clone();
    if !(rpo.threaded && replies_threaded) {
        child_indent.extend(parent.slot.clone());
    }
    let child_rpo = rpo.child(replies_threaded);

    for child in children {
        match child {
            Child::Post(link) => match listing.display {
                ReplyDisplay::Tree => flatten_post(ctx, &link, &child_indent, child_rpo, out)?,
                ReplyDisplay::RepivotList => {
                    emit_post(ctx, &link, &child_indent, child_rpo, out)?;
                }
            },
            Child::Loader(loader) => out.push(FlatItem::Loader(FlatLoader {
                target: LoadTarget::Loader(loader),
                indent: child_indent.clone(),
                depth: child_rpo.depth,
                at_or_above_pivot: false,
            })),
            Child::Error { note, data } => out.push(FlatItem::Error { note, data }),
        }
    }
    Ok(())
}

/// Replies of a listing with every resolved loader merged in place
fn collect_replies(ctx: &mut FlattenCtx<'_>, listing: &Listing) -> Vec<Child> {
    let mut children = Vec::new();
    let mut seen = HashSet::new();
    for item in &listing.items {
        expand_ref(ctx, item, &mut seen, &mut children);
    }
    if let Some(loader) = &listing.loader {
        expand_loader(ctx, loader, &mut seen, &mut children);
    }
    children
}

fn expand_ref(
    ctx: &mut FlattenCtx<'_>,
    item: &ReplyRef,
    seen: &mut HashSet<LinkKey>,
    children: &mut Vec<Child>,
) {
    match item {
        ReplyRef::Known(link) => children.push(Child::Post(link.clone())),
        ReplyRef::Pending(loader) => expand_loader(ctx, loader, seen, children),
    }
}

fn expand_loader(
    ctx: &mut FlattenCtx<'_>,
    loader: &Loader,
    seen: &mut HashSet<LinkKey>,
    children: &mut Vec<Child>,
) {
    if !seen.insert(loader.key.key()) {
        children.push(Child::Error {
            note: "loaded replies refer back to themselves".to_string(),
            data: loader.key.id().to_string(),
        });
        return;
    }
    match ctx.resolve(&loader.key) {
        Resolution::Value(items) => {
            for item in items {
                expand_ref(ctx, item, seen, children);
            }
        }
        Resolution::Error(note) => children.push(Child::Error {
            note,
            data: loader.key.id().to_string(),
        }),
        Resolution::Unresolved => children.push(Child::Loader(loader.clone())),
    }
}

/// Whether the single reply in `children` continues a threaded chain.
///
/// Looks exactly one level further down: a chain is threaded into a reply
/// that itself has one reply, and an already-threaded chain may end on a
/// leaf. It never runs into a fork.
fn continues_thread(ctx: &mut FlattenCtx<'_>, children: &[Child], threaded: bool) -> bool {
    let [Child::Post(only)] = children else {
        return false;
    };
    match peek_reply_count(ctx, only) {
        ReplyCount::One => true,
        ReplyCount::Zero => threaded,
        ReplyCount::Many | ReplyCount::Unknown => false,
    }
}

fn peek_reply_count(ctx: &mut FlattenCtx<'_>, link: &Link<Post>) -> ReplyCount {
    let Resolution::Value(post) = ctx.resolve(link) else {
        return ReplyCount::Unknown;
    };
    if let Shown::Unsupported(_) = unwrap_special(&post.content) {
        return ReplyCount::Unknown;
    }
    let Some(listing) = &post.replies else {
        return ReplyCount::Zero;
    };
    match collect_replies(ctx, listing).as_slice() {
        [] => ReplyCount::Zero,
        [Child::Post(_)] => ReplyCount::One,
        [_] => ReplyCount::Unknown,
        _ => ReplyCount::Many,
    }
}
