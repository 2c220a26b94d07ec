use serde::Serialize;

use crate::link::Link;
use crate::model::{Loader, Post, PostContent, ReplyComposer, SortOption};

/// One slot of a post's indent stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollapseButton {
    pub id: Link<Post>,
    /// Drawn as a thin joining line instead of a full collapse control
    pub threaded: bool,
    pub collapsed: bool,
}

/// Per-call render flags passed down the reply flattener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub is_pivot: bool,
    pub at_or_above_pivot: bool,
    pub threaded: bool,
    pub depth: usize,
    pub first_in_wrapper: bool,
}

impl RenderOptions {
    /// Options for a reply one level below `self`
    pub(crate) fn child(self, threaded: bool) -> Self {
        RenderOptions {
            is_pivot: false,
            at_or_above_pivot: false,
            threaded,
            depth: self.depth + 1,
            first_in_wrapper: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatPost {
    pub id: Link<Post>,
    pub content: PostContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub client_id: String,
    pub indent: Vec<CollapseButton>,
    /// This post's own collapse control, if it has one
    pub collapse: Option<CollapseButton>,
    pub first_in_wrapper: bool,
    pub is_pivot: bool,
    pub at_or_above_pivot: bool,
    pub threaded: bool,
    pub depth: usize,
}

impl FlatPost {
    pub fn is_collapsed(&self) -> bool {
        self.collapse.as_ref().is_some_and(|button| button.collapsed)
    }
}

/// What a loader placeholder would fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadTarget {
    Loader(Loader),
    /// A bare link with no store entry yet
    Link(Link<Post>),
}

impl LoadTarget {
    pub fn id(&self) -> &str {
        match self {
            LoadTarget::Loader(loader) => loader.key.id(),
            LoadTarget::Link(link) => link.id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatLoader {
    pub target: LoadTarget,
    pub indent: Vec<CollapseButton>,
    pub depth: usize,
    pub at_or_above_pivot: bool,
}

/// One element of the render-ready sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlatItem {
    WrapperStart,
    WrapperEnd,
    HorizontalLine,
    Post(FlatPost),
    Loader(FlatLoader),
    Todo { note: String, data: String },
    Error { note: String, data: String },
}

impl FlatItem {
    pub(crate) fn error(note: impl Into<String>, data: impl Into<String>) -> Self {
        FlatItem::Error {
            note: note.into(),
            data: data.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FlatItem::WrapperStart => "wrapper_start",
            FlatItem::WrapperEnd => "wrapper_end",
            FlatItem::HorizontalLine => "horizontal_line",
            FlatItem::Post(_) => "post",
            FlatItem::Loader(_) => "loader",
            FlatItem::Todo { .. } => "todo",
            FlatItem::Error { .. } => "error",
        }
    }

    pub fn as_post(&self) -> Option<&FlatPost> {
        match self {
            FlatItem::Post(post) => Some(post),
            _ => None,
        }
    }
}

/// Everything the rendering layer needs for one pivot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub pivot: Link<Post>,
    pub title: String,
    pub above_body: Vec<FlatItem>,
    pub body: Vec<FlatItem>,
    pub sidebar: Vec<FlatItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_options: Option<Vec<SortOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyComposer>,
}

impl PageView {
    pub(crate) fn new(pivot: Link<Post>) -> Self {
        PageView {
            pivot,
            title: String::new(),
            above_body: Vec::new(),
            body: Vec::new(),
            sidebar: Vec::new(),
            sort_options: None,
            reply: None,
        }
    }

    /// All three sequences, header first
    pub fn items(&self) -> impl Iterator<Item = &FlatItem> {
        self.above_body
            .iter()
            .chain(self.body.iter())
            .chain(self.sidebar.iter())
    }

    /// Unresolved loaders visible anywhere in the view, deduplicated by key
    pub fn loaders(&self) -> Vec<&Loader> {
        let mut seen = std::collections::HashSet::new();
        self.items()
            .filter_map(|item| match item {
                FlatItem::Loader(FlatLoader {
                    target: LoadTarget::Loader(loader),
                    ..
                }) => Some(loader),
                _ => None,
            })
            .filter(|loader| seen.insert(loader.key.key()))
            .collect()
    }
}
