//! Records output: one line per flat item
//!
//! ```text
//! H threadview=1 records=1 mode=render pivot=<id> title="..."
//! P <section> <id> depth=<n> threaded=<bool> collapsed=<bool|-> pivot=<bool> "<label>"
//! L <section> <key> depth=<n>
//! E <section> <id> "<note>"
//! T <section> <id> "<note>"
//! W <section> start|end
//! R <section>
//! ```

use threadview_core::flatten::{FlatItem, PageView};
use threadview_core::format::escape_quotes;

use super::label;

pub fn print(view: &PageView) {
    println!(
        "H threadview=1 records=1 mode=render pivot={} title=\"{}\"",
        view.pivot,
        escape_quotes(&view.title)
    );
    let sections = [
        ("above", &view.above_body),
        ("body", &view.body),
        ("sidebar", &view.sidebar),
    ];
    for (section, items) in sections {
        for item in items {
            println!("{}", record(section, item));
        }
    }
}

fn record(section: &str, item: &FlatItem) -> String {
    match item {
        FlatItem::WrapperStart => format!("W {} start", section),
        FlatItem::WrapperEnd => format!("W {} end", section),
        FlatItem::HorizontalLine => format!("R {}", section),
        FlatItem::Post(post) => {
            let collapsed = match &post.collapse {
                Some(button) => button.collapsed.to_string(),
                None => "-".to_string(),
            };
            format!(
                "P {} {} depth={} threaded={} collapsed={} pivot={} \"{}\"",
                section,
                post.id,
                post.depth,
                post.threaded,
                collapsed,
                post.is_pivot,
                escape_quotes(&label(&post.content))
            )
        }
        FlatItem::Loader(loader) => {
            format!("L {} {} depth={}", section, loader.target.id(), loader.depth)
        }
        FlatItem::Error { note, data } => {
            format!("E {} {} \"{}\"", section, data, escape_quotes(note))
        }
        FlatItem::Todo { note, data } => {
            format!("T {} {} \"{}\"", section, data, escape_quotes(note))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_record_escapes_note() {
        let item = FlatItem::Error {
            note: r#"said "no""#.into(),
            data: "c9".into(),
        };
        assert_eq!(record("body", &item), r#"E body c9 "said \"no\"""#);
        assert_eq!(record("sidebar", &FlatItem::HorizontalLine), "R sidebar");
    }
}
