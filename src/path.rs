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

//! # Kata Path Module
//!
//! Dotted path resolution against arbitrary JSON documents.
//!
//! A path such as `root.orders.0.sku` is split on `.`; a leading `root`
//! segment is an editor convenience and is stripped. Numeric segments index
//! into arrays, every other segment is a property lookup. Any miss yields
//! `None` rather than an error, so callers can treat a missing value as
//! absent and fall back to a default.
//!
//! ```rust
//! use kata::path::resolve;
//! use serde_json::json;
//!
//! let doc = json!({"user": {"tags": ["a", "b"]}});
//! assert_eq!(resolve(&doc, "user.tags.1"), Some(&json!("b")));
//! assert_eq!(resolve(&doc, "user.tags.9"), None);
//! ```

use std::fmt;

use serde_json::Value;

/// Leading segment stripped from every path.
pub const ROOT_SEGMENT: &str = "root";

/// Parsed dotted path. Parsing never fails; an empty path addresses the
/// document itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KaPath {
    segments: Vec<String>,
}

impl KaPath {
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::default();
        }

        let mut segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.first().map(String::as_str) == Some(ROOT_SEGMENT) {
            segments.remove(0);
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walks the document segment by segment.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.segments {
            current = match current {
                Value::Array(items) => {
                    let index = parse_index(segment)?;
                    items.get(index)?
                }
                Value::Object(map) => map.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }
}

impl fmt::Display for KaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for KaPath {
    fn from(path: &str) -> Self {
        KaPath::parse(path)
    }
}

/// Resolves `path` against `document`.
pub fn resolve<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    KaPath::parse(path).resolve(document)
}

// Base-10 digits only: "+1", " 1" and "-0" do not address array slots.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
