//! Ancestor walker: follows parent pointers up from the pivot

use std::collections::HashSet;

use tracing::debug;

use super::types::LoadTarget;
use super::FlattenCtx;
use crate::error::{Result, ThreadError};
use crate::link::{Link, LinkKey};
use crate::model::{Loader, ParentRef, Post, ReplyRef};
use crate::store::Resolution;

/// One entry of the ancestor chain
#[derive(Debug)]
pub(super) enum Ancestor<'a> {
    Post {
        link: Link<Post>,
        post: &'a Post,
        is_pivot: bool,
    },
    Loader(LoadTarget),
    Error {
        note: String,
        data: String,
    },
}

/// Walk from the pivot to the root.
///
/// Returns the chain furthest first with the pivot last. Fails only when
/// the pivot itself has no store entry.
pub(super) fn walk_ancestors<'a>(
    ctx: &mut FlattenCtx<'a>,
    pivot: &Link<Post>,
) -> Result<Vec<Ancestor<'a>>> {
    let mut chain = Vec::new();
    let mut visited: HashSet<LinkKey> = HashSet::new();
    let mut next = Some(pivot.clone());

    while let Some(link) = next.take() {
        let is_pivot = chain.is_empty();
        if !visited.insert(link.key()) {
            chain.push(Ancestor::Error {
                note: "parent chain loops back on itself".to_string(),
                data: link.id().to_string(),
            });
            break;
        }

        let post = match ctx.resolve(&link) {
            Resolution::Value(post) => post,
            Resolution::Unresolved if is_pivot => {
                return Err(ThreadError::PivotUnresolved {
                    id: link.id().to_string(),
                })
            }
            Resolution::Unresolved => {
                debug!(link = %link, "ancestor_unresolved");
                chain.push(Ancestor::Loader(LoadTarget::Link(link)));
                break;
            }
            Resolution::Error(note) => {
                chain.push(Ancestor::Error {
                    note,
                    data: link.id().to_string(),
                });
                break;
            }
        };

        chain.push(Ancestor::Post {
            link,
            post,
            is_pivot,
        });

        next = match &post.parent {
            None => None,
            Some(ParentRef::Known { link }) => Some(link.clone()),
            Some(ParentRef::Pending {
                loader,
                temp_parent,
            }) => {
                let before = chain.len();
                walk_loaded(ctx, loader, &mut visited, &mut chain);
                loaded_parent(&chain[before..]).or_else(|| temp_parent.clone())
            }
        };
    }

    chain.reverse();
    Ok(chain)
}

/// Known parent of the furthest loaded post, if the expansion ended on one
fn loaded_parent(expanded: &[Ancestor<'_>]) -> Option<Link<Post>> {
    match expanded.last() {
        Some(Ancestor::Post { post, .. }) => match &post.parent {
            Some(ParentRef::Known { link }) => Some(link.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Expand a pending parent: its loaded items (in reverse, nearest first)
/// when the loader has resolved, or a single loader placeholder.
fn walk_loaded<'a>(
    ctx: &mut FlattenCtx<'a>,
    loader: &Loader,
    visited: &mut HashSet<LinkKey>,
    chain: &mut Vec<Ancestor<'a>>,
) {
    if !visited.insert(loader.key.key()) {
        chain.push(Ancestor::Error {
            note: "loaded parents refer back to themselves".to_string(),
            data: loader.key.id().to_string(),
        });
        return;
    }

    let items = match ctx.resolve(&loader.key) {
        Resolution::Value(items) => items,
        Resolution::Error(note) => {
            chain.push(Ancestor::Error {
                note,
                data: loader.key.id().to_string(),
            });
            return;
        }
        Resolution::Unresolved => {
            debug!(key = %loader.key, "ancestor_loader_pending");
            chain.push(Ancestor::Loader(LoadTarget::Loader(loader.clone())));
            return;
        }
    };

    for item in items.iter().rev() {
        match item {
            ReplyRef::Pending(inner) => walk_loaded(ctx, inner, visited, chain),
            ReplyRef::Known(link) => {
                if !visited.insert(link.key()) {
                    continue;
                }
                match ctx.resolve(link) {
                    Resolution::Value(post) => chain.push(Ancestor::Post {
                        link: link.clone(),
                        post,
                        is_pivot: false,
                    }),
                    Resolution::Error(note) => chain.push(Ancestor::Error {
                        note,
                        data: link.id().to_string(),
                    }),
                    Resolution::Unresolved => {
                        chain.push(Ancestor::Loader(LoadTarget::Link(link.clone())))
                    }
                }
            }
        }
    }
}
