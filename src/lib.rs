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

//! # Kata Core Library
//!
//! Kata is a pipeline transformation engine. A pipeline is an ordered chain
//! of schemas; each schema is a named set of output fields fed either from
//! the raw source document (by a dotted path) or from a field of the schema
//! just before it. Evaluating the chain against a document yields one JSON
//! object per schema, the last of which is the final output.
//!
//! ## Module Overview
//!
//! - **path**: dotted/array-indexed path resolution against JSON
//! - **transform**: the closed set of per-field value transformations
//! - **schema**, **mapping**, **version**: the data model
//! - **graph**: schema-level mapping graph and cycle detection
//! - **validation**: the accept/reject hook for mapping edits
//! - **engine**: ordered per-stage evaluation
//! - **pipeline**: the editing aggregate around the engine
//! - **syslog**: syslog/CEF lines as source documents
//! - **inspect**: leaf path enumeration for editors
//! - **config**, **io**: engine configuration and file loading
//!
//! ## Feature Flags
//!
//! - `parallel`: evaluates batches on the rayon pool
//! - `full`: enables all features
//!
//! ## Quick Start
//!
//! ```rust
//! use kata::{KaField, KaFieldMapping, KaPipeline, KaSchema, KaTransformation, KaTransformationEngine};
//! use serde_json::json;
//!
//! let mut pipeline = KaPipeline::new("greetings").with_source_document(json!({"name": "ada"}));
//! pipeline.add_schema(KaSchema::new("s1", "Input").with_field(KaField::new("f1", "name", "name")))?;
//! pipeline.add_schema(KaSchema::new("s2", "Output").with_field(KaField::keyed("f2", "greeting")))?;
//! pipeline.add_mapping(KaFieldMapping::from_json("name", "s1", "f1"))?;
//! pipeline.add_mapping(
//!     KaFieldMapping::from_schema("s1", "f1", "s2", "f2").with_transformation(KaTransformation::Uppercase),
//! )?;
//!
//! let result = pipeline.evaluate(&KaTransformationEngine::new());
//! assert_eq!(result.final_output().unwrap()["greeting"], json!("ADA"));
//! # Ok::<(), kata::KaError>(())
//! ```
//!
//! ## Error Handling
//!
//! Evaluation never fails. Editing operations and file loading return
//! `Result<T, KaError>`; a rejected mapping edit is `KaError::Mapping`.

#![allow(non_snake_case)]

pub mod config;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod inspect;
pub mod io;
pub mod mapping;
pub mod path;
pub mod pipeline;
pub mod schema;
pub mod syslog;
pub mod transform;
pub mod validation;
pub mod version;

pub use config::KaEngineConfig;
pub use engine::{KaClock, KaEvaluation, KaFixedClock, KaStage, KaSystemClock, KaTransformationEngine};
pub use errors::{KaError, Result};
pub use graph::{would_create_cycle, KaMappingGraph};
pub use io::{KaFormat, KaIO};
pub use mapping::{KaFieldMapping, KaMappingKey, KaMappingSource};
pub use path::KaPath;
pub use pipeline::KaPipeline;
pub use schema::{KaField, KaFieldId, KaSchema, KaSchemaId};
pub use syslog::{KaCefEvent, KaCefHeader, KaSyslogMessage};
pub use transform::{KaNumberFormat, KaTransformation};
pub use validation::{validate_mapping, KaMappingValidator, KaValidationIssue, KaValidationReport};
pub use version::KaVersion;
