//! Content model: posts, reply listings and loaders
//!
//! These are the values adapters register in the [`ContentStore`](crate::store::ContentStore).
//! Partially-known trees are expressed with [`ReplyRef`] and [`ParentRef`]:
//! a reference is either a known link or a pending [`Loader`].

use serde::{Deserialize, Serialize};

use crate::link::Link;

/// A sequence of reply references produced by resolving a [`Loader`]
pub type ReplySequence = Vec<ReplyRef>;

/// A content unit: submission, comment, page or client root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub content: PostContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Listing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub client_id: String,
}

impl Post {
    /// Create a bare post with no parent and no replies
    pub fn new(content: PostContent) -> Self {
        Post {
            content,
            parent: None,
            replies: None,
            url: None,
            client_id: String::new(),
        }
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_replies(mut self, replies: Listing) -> Self {
        self.replies = Some(replies);
        self
    }
}

/// Tagged post content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostContent {
    Post(PostBody),
    Page(PageBody),
    Client(ClientBody),
    /// Content from an older producer, rendered through its fallback
    Legacy(LegacyBody),
}

impl PostContent {
    /// Shorthand for a plain post with a title and default collapse policy
    pub fn post(title: impl Into<String>) -> Self {
        PostContent::Post(PostBody {
            title: Some(title.into()),
            ..PostBody::default()
        })
    }

    pub fn page(title: impl Into<String>) -> Self {
        PostContent::Page(PageBody {
            title: title.into(),
            header: None,
            sidebar: Vec::new(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PostContent::Post(_) => "post",
            PostContent::Page(_) => "page",
            PostContent::Client(_) => "client",
            PostContent::Legacy(_) => "legacy",
        }
    }

    /// Collapse policy declared by the content producer
    pub fn collapsible(&self) -> Collapsible {
        match self {
            PostContent::Post(body) => body.collapsible,
            PostContent::Page(_) | PostContent::Client(_) | PostContent::Legacy(_) => {
                Collapsible::No
            }
        }
    }

    /// Title used when composing the page title
    pub fn display_title(&self) -> Option<&str> {
        match self {
            PostContent::Post(body) => body.title.as_deref(),
            PostContent::Page(page) => Some(page.title.as_str()),
            PostContent::Client(client) => Some(client.name.as_str()),
            PostContent::Legacy(legacy) => match legacy.fallback.as_deref() {
                Some(PostContent::Legacy(_)) | None => None,
                Some(fallback) => fallback.display_title(),
            },
        }
    }

    /// Pages and client roots contribute to the page title
    pub fn is_page_like(&self) -> bool {
        matches!(self, PostContent::Page(_) | PostContent::Client(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub collapsible: Collapsible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBody {
    pub title: String,
    /// Banner rendered above the body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Link<Post>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sidebar: Vec<Link<Post>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientBody {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyBody {
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Box<PostContent>>,
}

/// Collapse policy of a post
///
/// On the wire this is `false`, `"collapsed-unless-pivot"` or
/// `{"default_collapsed": bool}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CollapsibleRepr", into = "CollapsibleRepr")]
pub enum Collapsible {
    /// No collapse control at all
    No,
    /// Collapsed everywhere except when the post is the pivot
    CollapsedUnlessPivot,
    /// User-toggleable with a producer-chosen default
    Toggle { default_collapsed: bool },
}

impl Default for Collapsible {
    fn default() -> Self {
        Collapsible::Toggle {
            default_collapsed: false,
        }
    }
}

impl Collapsible {
    const COLLAPSED_UNLESS_PIVOT: &'static str = "collapsed-unless-pivot";

    /// Default collapsed flag for a new collapse entry, or `None` when the
    /// post has no collapse control
    pub fn default_collapsed(self, is_pivot: bool) -> Option<bool> {
        match self {
            Collapsible::No => None,
            Collapsible::CollapsedUnlessPivot => Some(!is_pivot),
            Collapsible::Toggle { default_collapsed } => Some(default_collapsed),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CollapsibleRepr {
    Flag(bool),
    Mode(String),
    Toggle { default_collapsed: bool },
}

impl TryFrom<CollapsibleRepr> for Collapsible {
    type Error = String;

    fn try_from(repr: CollapsibleRepr) -> Result<Self, Self::Error> {
        match repr {
            CollapsibleRepr::Flag(false) => Ok(Collapsible::No),
            CollapsibleRepr::Flag(true) => Ok(Collapsible::default()),
            CollapsibleRepr::Mode(mode) if mode == Collapsible::COLLAPSED_UNLESS_PIVOT => {
                Ok(Collapsible::CollapsedUnlessPivot)
            }
            CollapsibleRepr::Mode(other) => Err(format!(
                "unknown collapse mode '{}' (expected: {})",
                other,
                Collapsible::COLLAPSED_UNLESS_PIVOT
            )),
            CollapsibleRepr::Toggle { default_collapsed } => {
                Ok(Collapsible::Toggle { default_collapsed })
            }
        }
    }
}

impl From<Collapsible> for CollapsibleRepr {
    fn from(value: Collapsible) -> Self {
        match value {
            Collapsible::No => CollapsibleRepr::Flag(false),
            Collapsible::CollapsedUnlessPivot => {
                CollapsibleRepr::Mode(Collapsible::COLLAPSED_UNLESS_PIVOT.to_string())
            }
            Collapsible::Toggle { default_collapsed } => {
                CollapsibleRepr::Toggle { default_collapsed }
            }
        }
    }
}

/// How a listing's replies are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyDisplay {
    /// Nested tree below the parent
    #[default]
    Tree,
    /// Flat list of re-pivot targets, never descended into
    RepivotList,
}

/// Replies of a post ("PostReplies")
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub display: ReplyDisplay,
    #[serde(default)]
    pub items: Vec<ReplyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_options: Option<Vec<SortOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyComposer>,
    /// Pagination loader for further replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<Loader>,
}

impl Listing {
    /// A tree listing of known replies
    pub fn of(links: &[Link<Post>]) -> Self {
        Listing {
            items: links.iter().cloned().map(ReplyRef::Known).collect(),
            ..Listing::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Descriptor for the reply composer offered below a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyComposer {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Pending fetch that yields a [`ReplySequence`] stored under `key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loader {
    pub key: Link<ReplySequence>,
    /// Backend-specific request parameters, passed through untouched
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub request: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_count: Option<u32>,
}

impl Loader {
    pub fn new(key: impl Into<Link<ReplySequence>>) -> Self {
        Loader {
            key: key.into(),
            request: serde_json::Value::Null,
            load_count: None,
        }
    }
}

/// Element of a listing or loaded sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplyRef {
    #[serde(rename = "link")]
    Known(Link<Post>),
    #[serde(rename = "loader")]
    Pending(Loader),
}

/// Parent pointer of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentRef {
    Known {
        link: Link<Post>,
    },
    /// Parent chain not fetched yet. Once the loader resolves, walking resumes
    /// at the furthest loaded post's parent, else at `temp_parent`
    Pending {
        loader: Loader,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temp_parent: Option<Link<Post>>,
    },
}

impl ParentRef {
    pub fn known(link: impl Into<Link<Post>>) -> Self {
        ParentRef::Known { link: link.into() }
    }
}
