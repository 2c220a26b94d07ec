use threadview_core::flatten::{CollapseButton, FlatItem, PageView};

use super::label;

/// Print the page view as an indented outline
pub fn print(view: &PageView, quiet: bool) {
    if !quiet && !view.title.is_empty() {
        println!("{}", view.title);
        println!();
    }
    if !view.above_body.is_empty() {
        print_section(&view.above_body);
    }
    print_section(&view.body);
    if !view.sidebar.is_empty() {
        if !quiet {
            println!("Sidebar:");
        }
        print_section(&view.sidebar);
    }
    if !quiet {
        if let Some(sorts) = &view.sort_options {
            let names: Vec<&str> = sorts.iter().map(|s| s.name.as_str()).collect();
            println!("Sort: {}", names.join(", "));
        }
    }
}

fn print_section(items: &[FlatItem]) {
    for item in items {
        if let Some(line) = format_item(item) {
            println!("{}", line);
        }
    }
}

/// Indent rails: a full rail per open row, a dotted one for threaded joins
fn rails(indent: &[CollapseButton]) -> String {
    indent
        .iter()
        .map(|slot| if slot.threaded { ": " } else { "| " })
        .collect()
}

fn format_item(item: &FlatItem) -> Option<String> {
    let line = match item {
        FlatItem::WrapperStart => return None,
        FlatItem::WrapperEnd => String::new(),
        FlatItem::HorizontalLine => "-".repeat(40),
        FlatItem::Post(post) => {
            let marker = match &post.collapse {
                Some(button) if button.collapsed => "[+]",
                Some(_) => "[-]",
                None => " - ",
            };
            let pivot = if post.is_pivot { "  <" } else { "" };
            format!(
                "{}{} {} ({}){}",
                rails(&post.indent),
                marker,
                label(&post.content),
                post.id,
                pivot
            )
        }
        FlatItem::Loader(loader) => format!(
            "{}... load more ({})",
            rails(&loader.indent),
            loader.target.id()
        ),
        FlatItem::Todo { note, data } => format!("?   unsupported: {} ({})", note, data),
        FlatItem::Error { note, data } => format!("!   {} ({})", note, data),
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadview_core::flatten::{FlatLoader, LoadTarget};
    use threadview_core::link::Link;
    use threadview_core::model::Loader;

    fn slot(id: &str, threaded: bool) -> CollapseButton {
        CollapseButton {
            id: Link::new(id),
            threaded,
            collapsed: false,
        }
    }

    #[test]
    fn test_rails_mark_threaded_slots() {
        assert_eq!(rails(&[slot("a", false), slot("b", true)]), "| : ");
        assert_eq!(rails(&[]), "");
    }

    #[test]
    fn test_loader_and_error_lines() {
        let loader = FlatItem::Loader(FlatLoader {
            target: LoadTarget::Loader(Loader::new("more")),
            indent: vec![slot("p", false)],
            depth: 1,
            at_or_above_pivot: false,
        });
        assert_eq!(
            format_item(&loader).as_deref(),
            Some("| ... load more (more)")
        );
        let error = FlatItem::Error {
            note: "deleted".into(),
            data: "c3".into(),
        };
        assert_eq!(format_item(&error).as_deref(), Some("!   deleted (c3)"));
        assert_eq!(format_item(&FlatItem::WrapperStart), None);
    }
}
