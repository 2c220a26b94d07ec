use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};

pub fn threadview() -> Command {
    cargo_bin_cmd!("threadview")
}

/// Page `A`, post `B` (the pivot) under it, and reply `C` under `B`
#[allow(dead_code)]
pub const PAGE_THREAD: &str = r#"{
    "pivot": "B",
    "posts": {
        "A": { "content": { "kind": "page", "title": "Front page" } },
        "B": {
            "content": { "kind": "post", "title": "B" },
            "parent": { "link": "A" },
            "replies": { "items": [ { "link": "C" } ] }
        },
        "C": {
            "content": { "kind": "post", "title": "C" },
            "parent": { "link": "B" },
            "replies": { "items": [] }
        }
    }
}"#;

/// Write `content` to `dir/name` and return the path
#[allow(dead_code)]
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}
