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

//! # Kata Syslog Module
//!
//! Turns a raw BSD-style syslog line into a JSON source document.
//!
//! ```text
//! <134>Oct 11 22:14:15 fw01 app [src=10.0.0.1 user="ops"] {CEF:0|Acme|FW|1.2|100|Blocked|5|src=10.0.0.1 msg=port scan}
//! ```
//!
//! yields priority 134 (facility 16, severity 6), timestamp, hostname, the
//! first bracketed block as stream data and the trailing `{CEF:...}` block
//! split into its seven header fields and `key=value` extensions. Extension
//! values run up to the next key, so they may contain spaces.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static PRIORITY: OnceLock<Regex> = OnceLock::new();
static HEADER: OnceLock<Regex> = OnceLock::new();
static STREAM_BLOCK: OnceLock<Regex> = OnceLock::new();
static STREAM_PAIR: OnceLock<Regex> = OnceLock::new();
static CEF_BLOCK: OnceLock<Regex> = OnceLock::new();
static CEF_HEADER: OnceLock<Regex> = OnceLock::new();
static CEF_KEY: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("syslog pattern is valid"))
}

/// The seven pipe-separated CEF header fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaCefHeader {
    pub version: String,
    pub device_vendor: String,
    pub device_product: String,
    pub device_version: String,
    pub signature_id: String,
    pub name: String,
    pub severity: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KaCefEvent {
    pub header: KaCefHeader,
    pub extensions: BTreeMap<String, String>,
}

/// A parsed syslog line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaSyslogMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<u32>,
    pub timestamp: String,
    pub hostname: String,
    pub stream_data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cef: Option<KaCefEvent>,
    pub raw_message: String,
}

impl KaSyslogMessage {
    /// The message as a JSON document for the engine.
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Parses one syslog line; `None` when the timestamp/hostname header is
/// missing.
pub fn parse(line: &str) -> Option<KaSyslogMessage> {
    let line = line.trim();
    let (priority, rest) = match pattern(&PRIORITY, r"^<(\d{1,3})>(.*)$").captures(line) {
        Some(caps) => (
            caps[1].parse::<u32>().ok(),
            caps.get(2).map_or("", |m| m.as_str()).trim(),
        ),
        None => (None, line),
    };

    let header = pattern(&HEADER, r"^(\w+\s+\d+\s+\d+:\d+:\d+)\s+(\S+)\s+(.*)$");
    let Some(caps) = header.captures(rest) else {
        log::debug!("syslog line has no timestamp/hostname header");
        return None;
    };
    let remainder = caps[3].to_string();

    Some(KaSyslogMessage {
        priority,
        facility: priority.map(|p| p / 8),
        severity: priority.map(|p| p % 8),
        timestamp: caps[1].to_string(),
        hostname: caps[2].to_string(),
        stream_data: parse_stream_data(&remainder),
        cef: pattern(&CEF_BLOCK, r"\{(CEF:.*?)\}$")
            .captures(&remainder)
            .and_then(|caps| parse_cef(&caps[1])),
        raw_message: remainder,
    })
}

/// Key/value pairs of the first `[...]` block, quotes stripped.
pub fn parse_stream_data(text: &str) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    let Some(block) = pattern(&STREAM_BLOCK, r"\[([^\]]+)\]").captures(text) else {
        return data;
    };
    let pairs = pattern(&STREAM_PAIR, r#"([^\s=]+)=("[^"]*"|\S+)"#);
    for caps in pairs.captures_iter(&block[1]) {
        data.insert(caps[1].to_string(), caps[2].replace('"', ""));
    }
    data
}

/// Parses a `CEF:` payload. Malformed headers yield `None`.
pub fn parse_cef(payload: &str) -> Option<KaCefEvent> {
    let header = pattern(
        &CEF_HEADER,
        r"^CEF:([^|]+)\|([^|]+)\|([^|]+)\|([^|]+)\|([^|]+)\|([^|]+)\|([^|]+)\|(.*)$",
    );
    let Some(caps) = header.captures(payload) else {
        log::debug!("ignoring malformed CEF block");
        return None;
    };
    let field = |i: usize| caps[i].to_string();

    Some(KaCefEvent {
        header: KaCefHeader {
            version: field(1),
            device_vendor: field(2),
            device_product: field(3),
            device_version: field(4),
            signature_id: field(5),
            name: field(6),
            severity: field(7),
        },
        extensions: parse_extensions(&caps[8]),
    })
}

fn parse_extensions(text: &str) -> BTreeMap<String, String> {
    let keys: Vec<(usize, usize, &str)> = pattern(&CEF_KEY, r"(?:^|\s)(\w+)=")
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1)?;
            Some((whole.start(), whole.end(), key.as_str()))
        })
        .collect();

    let mut extensions = BTreeMap::new();
    for (i, (_, value_start, key)) in keys.iter().enumerate() {
        let value_end = keys.get(i + 1).map_or(text.len(), |next| next.0);
        extensions.insert(key.to_string(), text[*value_start..value_end].trim().to_string());
    }
    extensions
}
