//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Kata.
//! The Kata project belongs to the Dunimd Team.

use kata::inspect::{display_value, leaf_paths, leaves};
use kata::path::resolve;
use serde_json::json;

#[test]
fn test_inspect_lists_leaf_paths_in_order() {
    let doc = json!({
        "user": {"name": "ada", "tags": ["a", "b"]},
        "empty": {},
        "none": [],
        "n": null
    });

    assert_eq!(
        leaf_paths(&doc, false),
        vec!["user.name", "user.tags.0", "user.tags.1", "empty", "none", "n"]
    );
}

#[test]
fn test_inspect_root_prefix() {
    let doc = json!({"a": {"b": 1}});
    assert_eq!(leaf_paths(&doc, true), vec!["root.a.b"]);
}

#[test]
fn test_inspect_paths_resolve_back() {
    let doc = json!({"x": [{"y": 1}, {"z": [true, "s"]}], "w": "v"});
    for leaf in leaves(&doc, true) {
        assert_eq!(resolve(&doc, &leaf.path), Some(leaf.value));
    }
}

#[test]
fn test_inspect_display_values() {
    let doc = json!({"a": 1.5, "b": false, "c": ["x"]});
    assert_eq!(display_value(&doc, "root.a"), "1.5");
    assert_eq!(display_value(&doc, "b"), "false");
    assert_eq!(display_value(&doc, "c"), r#"["x"]"#);
    assert_eq!(display_value(&doc, "c.3"), "");
}
