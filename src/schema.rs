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

//! # Kata Schema Module
//!
//! Schemas are the stages of a pipeline. A schema is an ordered, named set
//! of fields; each field writes one property (its `key`) into the stage's
//! output object.
//!
//! ## Identity
//!
//! Schemas and fields are addressed by stable identifiers
//! ([`KaSchemaId`], [`KaFieldId`]) rather than by position or output key,
//! so renaming a key or reordering fields never rewires a mapping.
//!
//! ## Usage Example
//!
//! ```rust
//! use kata::schema::{KaField, KaSchema};
//! use serde_json::json;
//!
//! let schema = KaSchema::new("s1", "User")
//!     .with_field(KaField::new("f1", "name", "user.name"))
//!     .with_field(KaField::new("f2", "city", "user.address.city"));
//!
//! let preview = schema.extract(&json!({"user": {"name": "ada"}}));
//! assert_eq!(preview["name"], json!("ada"));
//! assert_eq!(preview["city"], json!(null));
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{KaError, Result};
use crate::path::KaPath;
use crate::version::KaVersion;

/// Stable schema identifier.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KaSchemaId(pub String);

impl KaSchemaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KaSchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for KaSchemaId {
    fn from(s: &str) -> Self {
        KaSchemaId(s.to_string())
    }
}

impl From<String> for KaSchemaId {
    fn from(s: String) -> Self {
        KaSchemaId(s)
    }
}

/// Field identifier, unique within its schema.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KaFieldId(pub String);

impl KaFieldId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KaFieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for KaFieldId {
    fn from(s: &str) -> Self {
        KaFieldId(s.to_string())
    }
}

impl From<String> for KaFieldId {
    fn from(s: String) -> Self {
        KaFieldId(s)
    }
}

/// One output slot of a schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KaField {
    pub id: KaFieldId,
    /// Property name written into the stage output.
    pub key: String,
    /// Extraction path into the raw source document. Only meaningful for
    /// fields of the first schema; later fields are fed by mappings.
    #[serde(default)]
    pub path: String,
}

impl KaField {
    pub fn new(id: impl Into<KaFieldId>, key: impl Into<String>, path: impl Into<String>) -> Self {
        KaField {
            id: id.into(),
            key: key.into(),
            path: path.into(),
        }
    }

    /// Field without an extraction path.
    pub fn keyed(id: impl Into<KaFieldId>, key: impl Into<String>) -> Self {
        Self::new(id, key, "")
    }

    pub fn has_path(&self) -> bool {
        !self.path.trim().is_empty()
    }
}

/// A pipeline stage: a named, versioned, ordered list of fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KaSchema {
    pub id: KaSchemaId,
    pub name: String,
    #[serde(default)]
    pub version: KaVersion,
    #[serde(default)]
    pub fields: Vec<KaField>,
    /// Sample input kept for editor previews; never read by evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_json: Option<Value>,
}

impl KaSchema {
    pub fn new(id: impl Into<KaSchemaId>, name: impl Into<String>) -> Self {
        KaSchema {
            id: id.into(),
            name: name.into(),
            version: KaVersion::default(),
            fields: Vec::new(),
            example_json: None,
        }
    }

    pub fn with_field(mut self, field: KaField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_version(mut self, version: KaVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example_json = Some(example);
        self
    }

    pub fn field(&self, id: &KaFieldId) -> Option<&KaField> {
        self.fields.iter().find(|field| &field.id == id)
    }

    pub fn contains_field(&self, id: &KaFieldId) -> bool {
        self.field(id).is_some()
    }

    /// Checks the schema invariants: non-empty ids and unique field ids.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(KaError::schema("schema id may not be empty"));
        }

        let mut ids = HashSet::new();
        let mut keys = HashSet::new();
        for field in &self.fields {
            if field.id.as_str().trim().is_empty() {
                return Err(KaError::schema(format!(
                    "schema '{}' has a field with an empty id",
                    self.id
                )));
            }
            if !ids.insert(&field.id) {
                return Err(KaError::schema(format!(
                    "schema '{}' declares field id '{}' more than once",
                    self.id, field.id
                )));
            }
            if !keys.insert(field.key.as_str()) {
                log::warn!(
                    "schema '{}' declares output key '{}' more than once; later fields overwrite earlier ones",
                    self.id,
                    field.key
                );
            }
        }
        Ok(())
    }

    /// Previews the schema against a document using each field's own path.
    ///
    /// Fields whose path misses produce `null`.
    pub fn extract(&self, document: &Value) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| {
                let value = KaPath::parse(&field.path)
                    .resolve(document)
                    .cloned()
                    .unwrap_or(Value::Null);
                (field.key.clone(), value)
            })
            .collect()
    }

    /// Previews the schema against its stored example document, if any.
    pub fn preview(&self) -> Option<Map<String, Value>> {
        self.example_json.as_ref().map(|example| self.extract(example))
    }
}
