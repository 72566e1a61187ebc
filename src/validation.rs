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

//! # Kata Mapping Validation
//!
//! The hook an editor calls before a mapping is persisted. A candidate is
//! accepted only when:
//!
//! 1. both endpoints exist (target schema and field; source schema and
//!    field for schema-sourced mappings);
//! 2. it respects pipeline adjacency: a JSON-sourced mapping targets the
//!    first schema, a schema-sourced mapping targets the schema right after
//!    its source;
//! 3. it does not close a cycle in the schema graph.
//!
//! Rejections are reported as [`KaError::Mapping`] and never reach
//! evaluation.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::errors::{KaError, Result};
use crate::graph::{would_create_cycle, KaMappingGraph};
use crate::mapping::{KaFieldMapping, KaMappingSource};
use crate::schema::{KaSchema, KaSchemaId};

/// Validates mappings against one ordered schema snapshot.
#[derive(Debug)]
pub struct KaMappingValidator<'a> {
    schemas: &'a [KaSchema],
    positions: HashMap<&'a KaSchemaId, usize>,
}

impl<'a> KaMappingValidator<'a> {
    pub fn new(schemas: &'a [KaSchema]) -> Self {
        let positions = schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| (&schema.id, index))
            .collect();
        Self { schemas, positions }
    }

    /// Position of `id` in pipeline order.
    pub fn position(&self, id: &KaSchemaId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    fn schema(&self, id: &KaSchemaId) -> Option<&'a KaSchema> {
        self.position(id).map(|index| &self.schemas[index])
    }

    /// Checks that every endpoint of `mapping` exists.
    pub fn check_endpoints(&self, mapping: &KaFieldMapping) -> Result<()> {
        let target = self.schema(&mapping.target_schema_id).ok_or_else(|| {
            KaError::mapping(format!("unknown target schema '{}'", mapping.target_schema_id))
        })?;
        if !target.contains_field(&mapping.target_field_id) {
            return Err(KaError::mapping(format!(
                "schema '{}' has no field '{}'",
                target.id, mapping.target_field_id
            )));
        }

        if let KaMappingSource::Schema { schema_id, field_id } = &mapping.source {
            let source = self.schema(schema_id).ok_or_else(|| {
                KaError::mapping(format!("unknown source schema '{schema_id}'"))
            })?;
            if !source.contains_field(field_id) {
                return Err(KaError::mapping(format!(
                    "schema '{}' has no field '{}'",
                    source.id, field_id
                )));
            }
        }
        Ok(())
    }

    /// Whether a mapping from `source` (`None` for the raw document) may
    /// target `target` under pipeline adjacency.
    pub fn is_valid_target(&self, source: Option<&KaSchemaId>, target: &KaSchemaId) -> bool {
        let Some(target_index) = self.position(target) else {
            return false;
        };
        match source {
            None => target_index == 0,
            Some(source) => match self.position(source) {
                Some(source_index) => target_index == source_index + 1,
                None => false,
            },
        }
    }

    /// Checks the adjacency rule for `mapping`.
    pub fn check_adjacency(&self, mapping: &KaFieldMapping) -> Result<()> {
        let source = mapping.source_schema_id();
        if self.is_valid_target(source, &mapping.target_schema_id) {
            return Ok(());
        }
        let message = match source {
            None => format!(
                "source document fields may only map into the first schema, not '{}'",
                mapping.target_schema_id
            ),
            Some(source) => format!(
                "schema '{}' may only map into the schema immediately after it, not '{}'",
                source, mapping.target_schema_id
            ),
        };
        Err(KaError::mapping(message))
    }

    /// Full acceptance check for a candidate mapping.
    pub fn validate(&self, existing: &[KaFieldMapping], candidate: &KaFieldMapping) -> Result<()> {
        self.check_endpoints(candidate)?;
        self.check_adjacency(candidate)?;
        if would_create_cycle(existing, candidate) {
            return Err(KaError::mapping(
                "this mapping would create a circular dependency",
            ));
        }
        Ok(())
    }

    /// Inspects a whole mapping set, collecting every problem found.
    pub fn report(&self, mappings: &[KaFieldMapping]) -> KaValidationReport {
        let mut report = KaValidationReport::default();

        let mut seen = HashSet::new();
        for schema in self.schemas {
            if !seen.insert(&schema.id) {
                report.push(None, format!("schema '{}' appears more than once", schema.id));
            }
            if let Err(err) = schema.validate() {
                report.push(None, err.to_string());
            }
        }

        let mut keys = HashSet::new();
        for (index, mapping) in mappings.iter().enumerate() {
            if !keys.insert(mapping.key()) {
                report.push(Some(index), "duplicate mapping".to_string());
            }
            if let Err(err) = self
                .check_endpoints(mapping)
                .and_then(|_| self.check_adjacency(mapping))
            {
                report.push(Some(index), err.to_string());
            }
        }

        let graph = KaMappingGraph::from_mappings(mappings);
        if let Err(err) = graph.topological_order() {
            report.push(None, err.to_string());
        } else {
            let order: Vec<KaSchemaId> = self.schemas.iter().map(|s| s.id.clone()).collect();
            if !graph.is_consistent_with(&order) {
                report.push(None, "mappings flow backwards against pipeline order".to_string());
            }
        }
        report
    }
}

/// One problem found by [`KaMappingValidator::report`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KaValidationIssue {
    /// Index of the offending mapping, when the problem is mapping-local.
    pub mapping_index: Option<usize>,
    pub message: String,
}

impl fmt::Display for KaValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mapping_index {
            Some(index) => write!(f, "mapping #{index}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KaValidationReport {
    pub issues: Vec<KaValidationIssue>,
}

impl KaValidationReport {
    fn push(&mut self, mapping_index: Option<usize>, message: String) {
        self.issues.push(KaValidationIssue {
            mapping_index,
            message,
        });
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Folds the report into a single validation error.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let joined = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(KaError::validation(joined))
    }
}

/// Accepts or rejects `candidate` against the current snapshot.
pub fn validate_mapping(
    schemas: &[KaSchema],
    existing: &[KaFieldMapping],
    candidate: &KaFieldMapping,
) -> Result<()> {
    KaMappingValidator::new(schemas).validate(existing, candidate)
}
