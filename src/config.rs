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

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{KaError, Result};

/// Tunables of the transformation engine.
///
/// Files may set any subset of the keys; the rest keep their defaults:
///
/// ```yaml
/// default_value: "n/a"
/// root_path_fallback: true
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KaEngineConfig {
    /// Written into fields that receive no value.
    pub default_value: Value,
    /// Lets unmapped fields of the first schema read the source document
    /// through their own `path`.
    pub root_path_fallback: bool,
}

impl Default for KaEngineConfig {
    fn default() -> Self {
        KaEngineConfig {
            default_value: Value::String(String::new()),
            root_path_fallback: false,
        }
    }
}

impl KaEngineConfig {
    pub fn with_default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn with_root_path_fallback(mut self, enabled: bool) -> Self {
        self.root_path_fallback = enabled;
        self
    }

    /// Parses a JSON configuration document.
    pub fn from_json(source: &str) -> Result<Self> {
        let builder: KaEngineConfigBuilder = serde_json::from_str(source)?;
        Ok(builder.build())
    }

    /// Parses a YAML configuration document.
    pub fn from_yaml(source: &str) -> Result<Self> {
        let builder: KaEngineConfigBuilder = serde_yaml::from_str(source)?;
        Ok(builder.build())
    }

    /// Loads configuration from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            other => Err(KaError::validation(format!(
                "unsupported configuration format '{other}' for {}",
                path.display()
            ))),
        }
    }
}

/// Partial configuration as read from disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KaEngineConfigBuilder {
    pub default_value: Option<Value>,
    pub root_path_fallback: Option<bool>,
}

impl KaEngineConfigBuilder {
    pub fn build(self) -> KaEngineConfig {
        let base = KaEngineConfig::default();
        KaEngineConfig {
            default_value: self.default_value.unwrap_or(base.default_value),
            root_path_fallback: self.root_path_fallback.unwrap_or(base.root_path_fallback),
        }
    }
}
