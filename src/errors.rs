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

//! # Kata Error Module
//!
//! This module defines the error types shared by every Kata component.
//!
//! ## Error Categories
//!
//! Evaluation itself never fails: path misses are `None` and misconfigured
//! transformations fall back to a documented value. Errors only surface at
//! the edges of the engine:
//!
//! - **Io**: reading pipeline definitions, documents or configuration files
//! - **Schema**: malformed schema records (duplicate field ids, bad version)
//! - **Validation**: invalid parameters or configuration values
//! - **Mapping**: a candidate mapping was rejected before being added
//!   (cycle or adjacency violation, dangling endpoint)
//! - **Pipeline**: pipeline editing failures (unknown schema, duplicates)
//! - **Serde**: serialization/deserialization errors
//! - **Internal**: unexpected internal failures
//!
//! ## Usage
//!
//! ```rust
//! use kata::errors::{KaError, Result};
//!
//! fn ensure_named(name: &str) -> Result<()> {
//!     if name.trim().is_empty() {
//!         return Err(KaError::validation("schema name may not be empty"));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Kata.
pub type Result<T> = std::result::Result<T, KaError>;

/// Canonical error enumeration for Kata.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
pub enum KaError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Errors caused by malformed schema records.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A mapping edit was rejected before reaching the mapping set.
    #[error("mapping rejected: {message}")]
    Mapping { message: String },

    /// Failures while editing a pipeline.
    #[error("pipeline error in '{pipeline}': {message}")]
    Pipeline { pipeline: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for KaError {
    fn from(err: io::Error) -> Self {
        KaError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KaError {
    fn from(err: serde_json::Error) -> Self {
        KaError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for KaError {
    fn from(err: serde_yaml::Error) -> Self {
        KaError::Serde(err.to_string())
    }
}

impl KaError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        KaError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        KaError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct mapping rejections.
    pub fn mapping<T: Into<String>>(message: T) -> Self {
        KaError::Mapping {
            message: message.into(),
        }
    }

    /// Helper to construct pipeline errors.
    pub fn pipeline(pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        KaError::Pipeline {
            pipeline: pipeline.into(),
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        KaError::Internal(message.into())
    }

    /// Whether this error is a rejected mapping edit.
    pub fn is_mapping_rejection(&self) -> bool {
        matches!(self, KaError::Mapping { .. })
    }
}
