use threadview_core::collapse::CollapseRegistry;
use threadview_core::error::ThreadError;
use threadview_core::flatten::{flatten_page, FlatItem, FlattenOptions, LoadTarget, PageView};
use threadview_core::link::Link;
use threadview_core::model::{Listing, ParentRef, Post, PostContent};
use threadview_core::store::{ContentStore, Resolution};

fn post(store: &mut ContentStore, id: &str, parent: Option<&str>, replies: &[&str]) {
    let links: Vec<Link<Post>> = replies.iter().map(|r| Link::new(*r)).collect();
    let mut post = Post::new(PostContent::post(id)).with_replies(Listing::of(&links));
    if let Some(parent) = parent {
        post = post.with_parent(ParentRef::known(parent));
    }
    store.register(&Link::new(id), post).unwrap();
}

fn render(store: &ContentStore, collapse: &mut CollapseRegistry, pivot: &str) -> PageView {
    flatten_page(store, collapse, &Link::new(pivot), &FlattenOptions::default())
        .unwrap()
        .view
}

/// Compact description of a sequence: `post:id`, `*` marks the pivot
fn shape(items: &[FlatItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            FlatItem::Post(p) if p.is_pivot => format!("post:{}*", p.id),
            FlatItem::Post(p) => format!("post:{}", p.id),
            FlatItem::Loader(loader) => format!("loader:{}", loader.target.id()),
            FlatItem::Error { data, .. } => format!("error:{}", data),
            other => other.kind().to_string(),
        })
        .collect()
}

fn post_ids(items: &[FlatItem]) -> Vec<&str> {
    items
        .iter()
        .filter_map(FlatItem::as_post)
        .map(|p| p.id.id())
        .collect()
}

#[test]
fn test_end_to_end_page_post_reply() {
    let mut store = ContentStore::new();
    store
        .register(&Link::new("A"), Post::new(PostContent::page("Front page")))
        .unwrap();
    post(&mut store, "B", Some("A"), &["C"]);
    post(&mut store, "C", Some("B"), &[]);

    let mut collapse = CollapseRegistry::new();
    let view = render(&store, &mut collapse, "B");
    assert_eq!(
        shape(&view.body),
        vec![
            "wrapper_start",
            "post:A",
            "wrapper_end",
            "horizontal_line",
            "wrapper_start",
            "post:B*",
            "post:C",
            "wrapper_end",
        ]
    );

    let a = view.body[1].as_post().unwrap();
    assert!(!a.is_pivot);
    assert!(a.at_or_above_pivot);
    let c = view.body[6].as_post().unwrap();
    assert!(!c.threaded);
    assert_eq!(c.depth, 1);
    assert!(!c.at_or_above_pivot);
    assert!(view.body[5].as_post().unwrap().first_in_wrapper);
    assert_eq!(view.title, "Front page | B");
}

#[test]
fn test_ancestors_precede_pivot_furthest_first() {
    let mut store = ContentStore::new();
    post(&mut store, "root", None, &["a"]);
    post(&mut store, "a", Some("root"), &["b"]);
    post(&mut store, "b", Some("a"), &["pivot"]);
    post(&mut store, "pivot", Some("b"), &[]);

    let mut collapse = CollapseRegistry::new();
    let view = render(&store, &mut collapse, "pivot");
    assert_eq!(
        shape(&view.body),
        vec![
            "wrapper_start",
            "post:root",
            "post:a",
            "post:b",
            "post:pivot*",
            "wrapper_end",
        ]
    );
    // Ancestors are shown alone, never with their reply trees
    assert!(view
        .body
        .iter()
        .filter_map(FlatItem::as_post)
        .all(|p| p.at_or_above_pivot && p.indent.is_empty()));
}

#[test]
fn test_flatten_is_idempotent() {
    let mut store = ContentStore::new();
    post(&mut store, "p", None, &["r1", "r2"]);
    post(&mut store, "r1", Some("p"), &["r1a"]);
    post(&mut store, "r1a", Some("r1"), &[]);
    post(&mut store, "r2", Some("p"), &[]);

    let mut collapse = CollapseRegistry::new();
    let first = render(&store, &mut collapse, "p");
    let second = render(&store, &mut collapse, "p");
    assert_eq!(first, second);
}

#[test]
fn test_collapsed_post_hides_its_subtree() {
    let mut store = ContentStore::new();
    post(&mut store, "p", None, &["x", "y"]);
    post(&mut store, "x", Some("p"), &["x1", "x2"]);
    post(&mut store, "x1", Some("x"), &["x1a"]);
    post(&mut store, "x1a", Some("x1"), &[]);
    post(&mut store, "x2", Some("x"), &[]);
    post(&mut store, "y", Some("p"), &[]);

    let mut collapse = CollapseRegistry::new();
    collapse.set_collapsed(&Link::new("x"), true);
    let view = render(&store, &mut collapse, "p");

    assert_eq!(post_ids(&view.body), vec!["p", "x", "y"]);
    let x = view.body.iter().filter_map(FlatItem::as_post).nth(1).unwrap();
    assert!(x.is_collapsed());
}

#[test]
fn test_threading_flags_for_chain_ending_in_fork() {
    let mut store = ContentStore::new();
    post(&mut store, "P", None, &["R1"]);
    post(&mut store, "R1", Some("P"), &["R2"]);
    post(&mut store, "R2", Some("R1"), &["R3", "R4"]);
    post(&mut store, "R3", Some("R2"), &[]);
    post(&mut store, "R4", Some("R2"), &[]);

    let mut collapse = CollapseRegistry::new();
    let view = render(&store, &mut collapse, "P");
    let flags: Vec<(&str, bool)> = view
        .body
        .iter()
        .filter_map(FlatItem::as_post)
        .map(|p| (p.id.id(), p.threaded))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("P", false),
            ("R1", true),
            ("R2", false),
            ("R3", false),
            ("R4", false),
        ]
    );
}

#[test]
fn test_threading_disabled_by_option() {
    let mut store = ContentStore::new();
    post(&mut store, "P", None, &["R1"]);
    post(&mut store, "R1", Some("P"), &["R2"]);
    post(&mut store, "R2", Some("R1"), &[]);

    let options = FlattenOptions {
        threading: false,
        ..FlattenOptions::default()
    };
    let mut collapse = CollapseRegistry::new();
    let view = flatten_page(&store, &mut collapse, &Link::new("P"), &options)
        .unwrap()
        .view;
    assert!(view
        .body
        .iter()
        .filter_map(FlatItem::as_post)
        .all(|p| !p.threaded));
}

#[test]
fn test_failed_sibling_does_not_disturb_the_others() {
    let mut store = ContentStore::new();
    post(&mut store, "p", None, &["a", "b", "c"]);
    post(&mut store, "a", Some("p"), &["a1"]);
    post(&mut store, "a1", Some("a"), &[]);
    store
        .mark_error(&Link::<Post>::new("b"), "HTTP 500")
        .unwrap();
    post(&mut store, "c", Some("p"), &[]);

    let mut collapse = CollapseRegistry::new();
    let view = render(&store, &mut collapse, "p");
    assert_eq!(
        shape(&view.body),
        vec![
            "wrapper_start",
            "post:p*",
            "post:a",
            "post:a1",
            "error:b",
            "post:c",
            "wrapper_end",
        ]
    );
    match &view.body[4] {
        FlatItem::Error { note, .. } => assert_eq!(note, "HTTP 500"),
        other => panic!("expected error item, got {:?}", other),
    }
}

#[test]
fn test_missing_parent_renders_one_loader_before_pivot() {
    let mut store = ContentStore::new();
    post(&mut store, "pivot", Some("not-fetched"), &[]);

    let mut collapse = CollapseRegistry::new();
    for _ in 0..2 {
        let view = render(&store, &mut collapse, "pivot");
        assert_eq!(
            shape(&view.body),
            vec![
                "wrapper_start",
                "loader:not-fetched",
                "post:pivot*",
                "wrapper_end",
            ]
        );
        match &view.body[1] {
            FlatItem::Loader(loader) => {
                assert!(matches!(loader.target, LoadTarget::Link(_)));
                assert!(loader.at_or_above_pivot);
            }
            other => panic!("expected loader, got {:?}", other),
        }
    }
}

#[test]
fn test_unresolved_pivot_is_an_error() {
    let store = ContentStore::new();
    let mut collapse = CollapseRegistry::new();
    let err = flatten_page(
        &store,
        &mut collapse,
        &Link::new("nowhere"),
        &FlattenOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ThreadError::PivotUnresolved { ref id } if id == "nowhere"));
}

#[test]
fn test_store_is_append_only() {
    let mut store = ContentStore::new();
    post(&mut store, "p", None, &[]);
    let err = store
        .register(&Link::new("p"), Post::new(PostContent::post("second")))
        .unwrap_err();
    assert!(matches!(err, ThreadError::AlreadyResolved { .. }));
    let err = store
        .mark_error(&Link::<Post>::new("p"), "too late")
        .unwrap_err();
    assert!(matches!(err, ThreadError::AlreadyResolved { .. }));

    match store.view(&Link::<Post>::new("p")) {
        Resolution::Value(post) => assert_eq!(post.content.display_title(), Some("p")),
        other => panic!("first value should remain, got {:?}", other),
    }
}

#[test]
fn test_dependencies_see_newly_registered_links() {
    let mut store = ContentStore::new();
    post(&mut store, "p", None, &["late"]);

    let mut collapse = CollapseRegistry::new();
    let options = FlattenOptions::default();
    let flattened = flatten_page(&store, &mut collapse, &Link::new("p"), &options).unwrap();
    assert!(!flattened.deps.is_stale(&store, &collapse));

    post(&mut store, "late", Some("p"), &[]);
    assert!(flattened.deps.is_stale(&store, &collapse));
}
