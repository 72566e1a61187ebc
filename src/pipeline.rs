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

//! # Kata Pipeline Module
//!
//! [`KaPipeline`] is the editing aggregate around the engine: an ordered
//! schema list, the mappings between them and the sample source document.
//! Every edit goes through a method that keeps the mapping set acceptable
//! (validated on insert, pruned when endpoints disappear) and bumps the
//! pipeline's patch version when it succeeds.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{KaEvaluation, KaTransformationEngine};
use crate::errors::{KaError, Result};
use crate::mapping::{KaFieldMapping, KaMappingKey, KaMappingSource};
use crate::schema::{KaField, KaSchema, KaSchemaId};
use crate::transform::KaTransformation;
use crate::validation::{validate_mapping, KaMappingValidator, KaValidationReport};
use crate::version::KaVersion;

/// Ordered schemas, their mappings and a source document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaPipeline {
    name: String,
    #[serde(default)]
    version: KaVersion,
    #[serde(default)]
    schemas: Vec<KaSchema>,
    #[serde(default)]
    mappings: Vec<KaFieldMapping>,
    #[serde(default, alias = "sourceJson")]
    source_document: Value,
}

impl KaPipeline {
    pub fn new(name: impl Into<String>) -> Self {
        KaPipeline {
            name: name.into(),
            version: KaVersion::default(),
            schemas: Vec::new(),
            mappings: Vec::new(),
            source_document: Value::Null,
        }
    }

    pub fn with_source_document(mut self, document: Value) -> Self {
        self.source_document = document;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> KaVersion {
        self.version
    }

    pub fn schemas(&self) -> &[KaSchema] {
        &self.schemas
    }

    pub fn mappings(&self) -> &[KaFieldMapping] {
        &self.mappings
    }

    pub fn source_document(&self) -> &Value {
        &self.source_document
    }

    pub fn set_source_document(&mut self, document: Value) {
        self.source_document = document;
    }

    pub fn schema(&self, id: &KaSchemaId) -> Option<&KaSchema> {
        self.schemas.iter().find(|schema| &schema.id == id)
    }

    fn position(&self, id: &KaSchemaId) -> Result<usize> {
        self.schemas
            .iter()
            .position(|schema| &schema.id == id)
            .ok_or_else(|| self.error(format!("unknown schema '{id}'")))
    }

    fn error(&self, message: impl Into<String>) -> KaError {
        KaError::pipeline(self.name.clone(), message)
    }

    fn bump(&mut self) {
        self.version = self.version.bump_patch();
    }

    /// Appends a schema at the end of the chain.
    pub fn add_schema(&mut self, schema: KaSchema) -> Result<()> {
        schema.validate()?;
        if self.schema(&schema.id).is_some() {
            return Err(self.error(format!("schema '{}' already exists", schema.id)));
        }
        self.schemas.push(schema);
        self.bump();
        Ok(())
    }

    /// Removes a schema together with every mapping touching it.
    pub fn remove_schema(&mut self, id: &KaSchemaId) -> Result<KaSchema> {
        let index = self.position(id)?;
        let removed = self.schemas.remove(index);
        let before = self.mappings.len();
        self.mappings.retain(|mapping| !mapping.touches_schema(id));
        log::debug!(
            "removed schema '{}' and {} mapping(s)",
            id,
            before - self.mappings.len()
        );
        self.bump();
        Ok(removed)
    }

    /// Moves `moving` to the position currently held by `target`.
    ///
    /// Mappings are kept; ones that no longer respect adjacency show up in
    /// [`KaPipeline::validate`].
    pub fn reorder_schema(&mut self, moving: &KaSchemaId, target: &KaSchemaId) -> Result<()> {
        let from = self.position(moving)?;
        let to = self.position(target)?;
        if from == to {
            return Ok(());
        }
        let schema = self.schemas.remove(from);
        self.schemas.insert(to, schema);

        let report = self.validate();
        if !report.is_valid() {
            log::warn!(
                "reordering '{}' left {} mapping issue(s) in pipeline '{}'",
                moving,
                report.issues.len(),
                self.name
            );
        }
        self.bump();
        Ok(())
    }

    /// Accepts `mapping` if it passes the validation hook.
    pub fn add_mapping(&mut self, mapping: KaFieldMapping) -> Result<()> {
        let key = mapping.key();
        if self.mappings.iter().any(|existing| existing.key() == key) {
            return Err(KaError::mapping("an identical mapping already exists"));
        }
        validate_mapping(&self.schemas, &self.mappings, &mapping)?;
        self.mappings.push(mapping);
        self.bump();
        Ok(())
    }

    pub fn remove_mapping(&mut self, key: &KaMappingKey) -> Result<KaFieldMapping> {
        let index = self.mapping_index(key)?;
        let removed = self.mappings.remove(index);
        self.bump();
        Ok(removed)
    }

    /// Replaces the transformation of the mapping identified by `key`.
    pub fn set_transformation(
        &mut self,
        key: &KaMappingKey,
        transformation: Option<KaTransformation>,
    ) -> Result<()> {
        let index = self.mapping_index(key)?;
        self.mappings[index].transformation = transformation;
        self.bump();
        Ok(())
    }

    fn mapping_index(&self, key: &KaMappingKey) -> Result<usize> {
        self.mappings
            .iter()
            .position(|mapping| &mapping.key() == key)
            .ok_or_else(|| self.error("no such mapping"))
    }

    /// Replaces a schema's fields, bumping its version and dropping
    /// mappings whose endpoint field no longer exists. Returns the number
    /// of mappings dropped.
    pub fn update_schema_fields(&mut self, id: &KaSchemaId, fields: Vec<KaField>) -> Result<usize> {
        let index = self.position(id)?;
        let mut updated = self.schemas[index].clone();
        updated.fields = fields;
        updated.validate()?;
        updated.version = updated.version.bump_patch();

        let before = self.mappings.len();
        self.mappings.retain(|mapping| {
            let target_ok = !mapping.targets(id) || updated.contains_field(&mapping.target_field_id);
            let source_ok = match &mapping.source {
                KaMappingSource::Schema { schema_id, field_id } if schema_id == id => {
                    updated.contains_field(field_id)
                }
                _ => true,
            };
            target_ok && source_ok
        });
        let pruned = before - self.mappings.len();
        if pruned > 0 {
            log::info!("pruned {} mapping(s) after editing schema '{}'", pruned, id);
        }

        self.schemas[index] = updated;
        self.bump();
        Ok(pruned)
    }

    /// Reports every problem of the current pipeline.
    pub fn validate(&self) -> KaValidationReport {
        KaMappingValidator::new(&self.schemas).report(&self.mappings)
    }

    /// Evaluates the pipeline against its own source document.
    pub fn evaluate(&self, engine: &KaTransformationEngine) -> KaEvaluation {
        engine.evaluate(&self.schemas, &self.mappings, &self.source_document)
    }

    /// Evaluates the pipeline against another document.
    pub fn evaluate_document(&self, engine: &KaTransformationEngine, document: &Value) -> KaEvaluation {
        engine.evaluate(&self.schemas, &self.mappings, document)
    }
}
