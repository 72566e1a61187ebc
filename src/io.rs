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

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::engine::KaEvaluation;
use crate::errors::{KaError, Result};
use crate::pipeline::KaPipeline;

/// File formats Kata reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KaFormat {
    Json,
    Yaml,
    Jsonl,
}

/// File loading façade for documents and pipeline definitions.
pub struct KaIO;

impl KaIO {
    /// Infers the format from the file extension.
    pub fn detect_format(path: impl AsRef<Path>) -> Option<KaFormat> {
        let ext = path
            .as_ref()
            .extension()?
            .to_string_lossy()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(KaFormat::Json),
            "yaml" | "yml" => Some(KaFormat::Yaml),
            "jsonl" | "ndjson" => Some(KaFormat::Jsonl),
            _ => None,
        }
    }

    fn require_format(path: &Path) -> Result<KaFormat> {
        Self::detect_format(path).ok_or_else(|| {
            KaError::validation(format!(
                "unable to detect format from extension of {}",
                path.display()
            ))
        })
    }

    /// Loads every source document in a file. JSON arrays and JSONL files
    /// yield one document per element/line; anything else is one document.
    pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<Value>> {
        let path = path.as_ref();
        match Self::require_format(path)? {
            KaFormat::Jsonl => Self::load_jsonl_reader(BufReader::new(File::open(path)?)),
            KaFormat::Json | KaFormat::Yaml => match Self::load_document(path)? {
                Value::Array(items) => Ok(items),
                other => Ok(vec![other]),
            },
        }
    }

    /// Loads a single JSON or YAML document.
    pub fn load_document(path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match Self::require_format(path)? {
            KaFormat::Json => Ok(serde_json::from_str(&content)?),
            KaFormat::Yaml => Ok(serde_yaml::from_str(&content)?),
            KaFormat::Jsonl => Err(KaError::validation(
                "JSONL files hold several documents; use load_documents",
            )),
        }
    }

    /// Reads one document per non-blank line.
    pub fn load_jsonl_reader<R: BufRead>(reader: R) -> Result<Vec<Value>> {
        reader
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| match line {
                Ok(content) if content.trim().is_empty() => None,
                Ok(content) => Some(serde_json::from_str(&content).map_err(|err| {
                    KaError::Serde(format!("line {}: {err}", idx + 1))
                })),
                Err(err) => Some(Err(err.into())),
            })
            .collect()
    }

    /// Loads a pipeline definition and checks it.
    pub fn load_pipeline(path: impl AsRef<Path>) -> Result<KaPipeline> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let pipeline: KaPipeline = match Self::require_format(path)? {
            KaFormat::Json => serde_json::from_str(&content)?,
            KaFormat::Yaml => serde_yaml::from_str(&content)?,
            KaFormat::Jsonl => {
                return Err(KaError::validation(
                    "pipeline definitions must be JSON or YAML",
                ))
            }
        };
        pipeline.validate().into_result()?;
        log::info!(
            "loaded pipeline '{}' v{} with {} schema(s)",
            pipeline.name(),
            pipeline.version(),
            pipeline.schemas().len()
        );
        Ok(pipeline)
    }

    /// Writes a pipeline definition in the format implied by the extension.
    pub fn save_pipeline(path: impl AsRef<Path>, pipeline: &KaPipeline) -> Result<()> {
        let path = path.as_ref();
        let rendered = match Self::require_format(path)? {
            KaFormat::Json => serde_json::to_string_pretty(pipeline)?,
            KaFormat::Yaml => serde_yaml::to_string(pipeline)?,
            KaFormat::Jsonl => {
                return Err(KaError::validation(
                    "pipeline definitions must be JSON or YAML",
                ))
            }
        };
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Writes each evaluation's final output as one JSONL line.
    pub fn write_outputs_jsonl<W: Write>(mut writer: W, evaluations: &[KaEvaluation]) -> Result<()> {
        for evaluation in evaluations {
            let output = evaluation
                .final_output()
                .map(|map| Value::Object(map.clone()))
                .unwrap_or(Value::Null);
            serde_json::to_writer(&mut writer, &output)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_outputs_file(path: impl AsRef<Path>, evaluations: &[KaEvaluation]) -> Result<()> {
        let file = File::create(path)?;
        Self::write_outputs_jsonl(BufWriter::new(file), evaluations)
    }
}
