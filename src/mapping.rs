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

//! # Kata Mapping Module
//!
//! A field mapping is a directed edge telling a target field where its value
//! comes from: a path into the raw source document (`sourceType: "json"`) or
//! the output of a field in an earlier schema (`sourceType: "schema"`).
//!
//! The wire shape is the flat editor record:
//!
//! ```json
//! {
//!   "sourceType": "schema",
//!   "sourceSchemaId": "s1",
//!   "sourceFieldId": "f1",
//!   "targetSchemaId": "s2",
//!   "targetFieldId": "f2",
//!   "transformation": {"type": "uppercase"}
//! }
//! ```
//!
//! JSON-sourced records carry `sourceReference` (the path) instead of the
//! source schema and field; any extra keys are ignored on input.

use serde::{Deserialize, Serialize};

use crate::schema::{KaFieldId, KaSchemaId};
use crate::transform::KaTransformation;

static NO_TRANSFORMATION: KaTransformation = KaTransformation::None;

/// Where a mapping reads its value from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "sourceType", rename_all = "lowercase")]
pub enum KaMappingSource {
    /// Path into the raw source document.
    Json {
        #[serde(rename = "sourceReference")]
        reference: String,
    },
    /// Output of a field in another schema.
    Schema {
        #[serde(rename = "sourceSchemaId")]
        schema_id: KaSchemaId,
        #[serde(rename = "sourceFieldId")]
        field_id: KaFieldId,
    },
}

/// Directed, typed edge feeding one target field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaFieldMapping {
    #[serde(flatten)]
    pub source: KaMappingSource,
    pub target_schema_id: KaSchemaId,
    pub target_field_id: KaFieldId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<KaTransformation>,
}

/// Identity of a mapping, ignoring its transformation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KaMappingKey {
    pub source: KaMappingSource,
    pub target_schema_id: KaSchemaId,
    pub target_field_id: KaFieldId,
}

impl KaFieldMapping {
    /// Mapping from a path in the raw source document.
    pub fn from_json(
        reference: impl Into<String>,
        target_schema_id: impl Into<KaSchemaId>,
        target_field_id: impl Into<KaFieldId>,
    ) -> Self {
        KaFieldMapping {
            source: KaMappingSource::Json {
                reference: reference.into(),
            },
            target_schema_id: target_schema_id.into(),
            target_field_id: target_field_id.into(),
            transformation: None,
        }
    }

    /// Mapping from a field of an earlier schema.
    pub fn from_schema(
        source_schema_id: impl Into<KaSchemaId>,
        source_field_id: impl Into<KaFieldId>,
        target_schema_id: impl Into<KaSchemaId>,
        target_field_id: impl Into<KaFieldId>,
    ) -> Self {
        KaFieldMapping {
            source: KaMappingSource::Schema {
                schema_id: source_schema_id.into(),
                field_id: source_field_id.into(),
            },
            target_schema_id: target_schema_id.into(),
            target_field_id: target_field_id.into(),
            transformation: None,
        }
    }

    pub fn with_transformation(mut self, transformation: KaTransformation) -> Self {
        self.transformation = Some(transformation);
        self
    }

    /// The transformation to apply; `none` when unset.
    pub fn transformation(&self) -> &KaTransformation {
        self.transformation.as_ref().unwrap_or(&NO_TRANSFORMATION)
    }

    pub fn source_schema_id(&self) -> Option<&KaSchemaId> {
        match &self.source {
            KaMappingSource::Schema { schema_id, .. } => Some(schema_id),
            KaMappingSource::Json { .. } => None,
        }
    }

    pub fn source_field_id(&self) -> Option<&KaFieldId> {
        match &self.source {
            KaMappingSource::Schema { field_id, .. } => Some(field_id),
            KaMappingSource::Json { .. } => None,
        }
    }

    pub fn is_json_sourced(&self) -> bool {
        matches!(self.source, KaMappingSource::Json { .. })
    }

    pub fn key(&self) -> KaMappingKey {
        KaMappingKey {
            source: self.source.clone(),
            target_schema_id: self.target_schema_id.clone(),
            target_field_id: self.target_field_id.clone(),
        }
    }

    pub fn targets(&self, schema_id: &KaSchemaId) -> bool {
        &self.target_schema_id == schema_id
    }

    /// Whether either endpoint lies in `schema_id`.
    pub fn touches_schema(&self, schema_id: &KaSchemaId) -> bool {
        self.targets(schema_id) || self.source_schema_id() == Some(schema_id)
    }
}
