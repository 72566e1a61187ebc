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

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{KaError, Result};

/// `major.minor.patch` version carried by schemas and pipelines.
///
/// Serialized as its dotted string form. Every accepted edit bumps the
/// patch component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KaVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl KaVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        KaVersion {
            major,
            minor,
            patch,
        }
    }

    /// Returns the next patch version.
    pub fn bump_patch(&self) -> Self {
        KaVersion {
            patch: self.patch.saturating_add(1),
            ..*self
        }
    }
}

impl Default for KaVersion {
    fn default() -> Self {
        KaVersion::new(1, 0, 0)
    }
}

impl fmt::Display for KaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for KaVersion {
    type Err = KaError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(KaError::schema(format!(
                "version '{s}' must have the form major.minor.patch"
            )));
        }
        let component = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| KaError::schema(format!("invalid version component '{part}' in '{s}'")))
        };
        Ok(KaVersion {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
        })
    }
}

impl TryFrom<String> for KaVersion {
    type Error = KaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<KaVersion> for String {
    fn from(version: KaVersion) -> Self {
        version.to_string()
    }
}
