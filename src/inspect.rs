//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Kata.
//! The Kata project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Kata Inspect Module
//!
//! Walks a source document so an editor can offer the paths a root field
//! may extract. Paths use the same dotted form [`crate::path`] resolves,
//! array elements appear as numeric segments and empty containers are
//! reported as leaves.

use serde_json::Value;

use crate::path::{resolve, ROOT_SEGMENT};
use crate::transform::coerce_string;

/// A scalar (or empty container) found while walking a document.
#[derive(Clone, Debug, PartialEq)]
pub struct KaLeaf<'a> {
    pub path: String,
    pub value: &'a Value,
}

impl KaLeaf<'_> {
    pub fn kind(&self) -> &'static str {
        value_kind(self.value)
    }
}

/// JSON type name of `value`.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Every leaf of `document` in document order. With `with_root`, paths are
/// prefixed by `root`.
pub fn leaves(document: &Value, with_root: bool) -> Vec<KaLeaf<'_>> {
    let mut out = Vec::new();
    let prefix = if with_root { ROOT_SEGMENT } else { "" };
    walk(document, prefix.to_string(), &mut out);
    out
}

/// Paths of every leaf of `document`.
pub fn leaf_paths(document: &Value, with_root: bool) -> Vec<String> {
    leaves(document, with_root)
        .into_iter()
        .map(|leaf| leaf.path)
        .collect()
}

fn walk<'a>(value: &'a Value, path: String, out: &mut Vec<KaLeaf<'a>>) {
    let join = |segment: &str| {
        if path.is_empty() {
            segment.to_string()
        } else {
            format!("{path}.{segment}")
        }
    };
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                walk(child, join(key), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                walk(child, join(&index.to_string()), out);
            }
        }
        _ => out.push(KaLeaf { path, value }),
    }
}

/// Value at `path` rendered as text; empty when absent or null.
pub fn display_value(document: &Value, path: &str) -> String {
    match resolve(document, path) {
        None | Some(Value::Null) => String::new(),
        Some(value) => coerce_string(value),
    }
}
