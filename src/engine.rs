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

//! # Kata Transformation Engine
//!
//! Evaluates an ordered schema chain against one source document.
//!
//! ## Evaluation Order
//!
//! Schemas are evaluated strictly in pipeline order. For schema *i* every
//! mapping that targets it is applied in mapping order:
//!
//! - a `json` mapping resolves its reference against the source document;
//! - a `schema` mapping reads the already computed output of an earlier
//!   stage by the source field's output key. Sources that are not earlier
//!   in the order yield nothing.
//!
//! The resolved value goes through the mapping's transformation and is
//! written under the target field's key. When several mappings feed the same
//! field, the last one wins. Fields left without a value take the configured
//! default, so every stage object carries exactly its schema's keys in field
//! order.
//!
//! Evaluation never fails. Mappings pointing at a missing target field are
//! skipped with a warning.
//!
//! ## Usage Example
//!
//! ```rust
//! use kata::engine::KaTransformationEngine;
//! use kata::mapping::KaFieldMapping;
//! use kata::schema::{KaField, KaSchema};
//! use kata::transform::KaTransformation;
//! use serde_json::json;
//!
//! let schemas = vec![
//!     KaSchema::new("s1", "Input").with_field(KaField::new("f1", "name", "user.name")),
//!     KaSchema::new("s2", "Greeting").with_field(KaField::keyed("f2", "greeting")),
//! ];
//! let mappings = vec![
//!     KaFieldMapping::from_json("user.name", "s1", "f1"),
//!     KaFieldMapping::from_schema("s1", "f1", "s2", "f2")
//!         .with_transformation(KaTransformation::Uppercase),
//! ];
//!
//! let engine = KaTransformationEngine::new();
//! let result = engine.evaluate(&schemas, &mappings, &json!({"user": {"name": "ada"}}));
//! assert_eq!(result.final_output().unwrap()["greeting"], json!("ADA"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::KaEngineConfig;
use crate::mapping::{KaFieldMapping, KaMappingSource};
use crate::path::resolve;
use crate::schema::{KaFieldId, KaSchema, KaSchemaId};

/// Source of the instant stamped by `timestamp` transformations.
pub trait KaClock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct KaSystemClock;

impl KaClock for KaSystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant, for reproducible runs.
#[derive(Clone, Copy, Debug)]
pub struct KaFixedClock(pub DateTime<Utc>);

impl KaClock for KaFixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Output of one schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KaStage {
    pub schema_id: KaSchemaId,
    pub output: Map<String, Value>,
}

/// Per-stage outputs of one evaluation, in pipeline order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KaEvaluation {
    pub stages: Vec<KaStage>,
}

impl KaEvaluation {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Output of the last stage; `None` for an empty pipeline.
    pub fn final_output(&self) -> Option<&Map<String, Value>> {
        self.stages.last().map(|stage| &stage.output)
    }

    pub fn stage(&self, schema_id: &KaSchemaId) -> Option<&Map<String, Value>> {
        self.stages
            .iter()
            .find(|stage| &stage.schema_id == schema_id)
            .map(|stage| &stage.output)
    }

    /// Stage objects as a JSON array.
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.stages
                .iter()
                .map(|stage| Value::Object(stage.output.clone()))
                .collect(),
        )
    }

    pub fn into_values(self) -> Vec<Value> {
        self.stages
            .into_iter()
            .map(|stage| Value::Object(stage.output))
            .collect()
    }

    /// xxh3 of the serialized stage objects. Equal digests mean equal
    /// outputs, key order included.
    pub fn digest(&self) -> u64 {
        let bytes = serde_json::to_vec(&self.to_value()).unwrap_or_default();
        xxh3_64(&bytes)
    }
}

/// Stateless evaluator of schema chains.
#[derive(Clone, Debug)]
pub struct KaTransformationEngine {
    config: KaEngineConfig,
    clock: Arc<dyn KaClock>,
}

impl Default for KaTransformationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KaTransformationEngine {
    pub fn new() -> Self {
        Self::with_config(KaEngineConfig::default())
    }

    pub fn with_config(config: KaEngineConfig) -> Self {
        KaTransformationEngine {
            config,
            clock: Arc::new(KaSystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl KaClock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &KaEngineConfig {
        &self.config
    }

    /// Evaluates `schemas` in order against `source`.
    ///
    /// The clock is read once, so every `timestamp` field of one evaluation
    /// carries the same instant.
    pub fn evaluate(
        &self,
        schemas: &[KaSchema],
        mappings: &[KaFieldMapping],
        source: &Value,
    ) -> KaEvaluation {
        let now = self.clock.now();
        let positions: HashMap<&KaSchemaId, usize> = schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| (&schema.id, index))
            .collect();

        let mut stages: Vec<KaStage> = Vec::with_capacity(schemas.len());
        for (index, schema) in schemas.iter().enumerate() {
            let mut resolved: HashMap<&KaFieldId, Option<Value>> = HashMap::new();

            for mapping in mappings.iter().filter(|m| m.targets(&schema.id)) {
                let Some(field) = schema.field(&mapping.target_field_id) else {
                    log::warn!(
                        "skipping mapping into '{}': schema has no field '{}'",
                        schema.id,
                        mapping.target_field_id
                    );
                    continue;
                };
                let value = match &mapping.source {
                    KaMappingSource::Json { reference } => resolve(source, reference).cloned(),
                    KaMappingSource::Schema {
                        schema_id,
                        field_id,
                    } => Self::lookup(schemas, &positions, &stages, index, schema_id, field_id),
                };
                resolved.insert(&field.id, mapping.transformation().apply_at(value, now));
            }

            let mut output = Map::new();
            for field in &schema.fields {
                let value = match resolved.remove(&field.id) {
                    Some(value) => value,
                    None if index == 0 && self.config.root_path_fallback && field.has_path() => {
                        resolve(source, &field.path).cloned()
                    }
                    None => None,
                };
                output.insert(
                    field.key.clone(),
                    value.unwrap_or_else(|| self.config.default_value.clone()),
                );
            }

            log::debug!(
                "evaluated schema '{}' ({} of {}): {} fields",
                schema.id,
                index + 1,
                schemas.len(),
                output.len()
            );
            stages.push(KaStage {
                schema_id: schema.id.clone(),
                output,
            });
        }

        KaEvaluation { stages }
    }

    // Reads an earlier stage's output by the source field's key.
    fn lookup(
        schemas: &[KaSchema],
        positions: &HashMap<&KaSchemaId, usize>,
        stages: &[KaStage],
        current: usize,
        schema_id: &KaSchemaId,
        field_id: &KaFieldId,
    ) -> Option<Value> {
        let position = *positions.get(schema_id)?;
        if position >= current {
            log::debug!(
                "schema '{}' is not evaluated before '{}'",
                schema_id,
                schemas[current].id
            );
            return None;
        }
        let field = schemas[position].field(field_id)?;
        stages.get(position)?.output.get(&field.key).cloned()
    }

    /// Evaluates the same chain against many documents.
    #[cfg(feature = "parallel")]
    pub fn evaluate_batch(
        &self,
        schemas: &[KaSchema],
        mappings: &[KaFieldMapping],
        sources: &[Value],
    ) -> Vec<KaEvaluation> {
        use rayon::prelude::*;

        sources
            .par_iter()
            .map(|source| self.evaluate(schemas, mappings, source))
            .collect()
    }

    /// Evaluates the same chain against many documents.
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate_batch(
        &self,
        schemas: &[KaSchema],
        mappings: &[KaFieldMapping],
        sources: &[Value],
    ) -> Vec<KaEvaluation> {
        sources
            .iter()
            .map(|source| self.evaluate(schemas, mappings, source))
            .collect()
    }
}

/// Evaluates with a default engine.
pub fn evaluate(schemas: &[KaSchema], mappings: &[KaFieldMapping], source: &Value) -> KaEvaluation {
    KaTransformationEngine::new().evaluate(schemas, mappings, source)
}
