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

//! # Kata Transform Module
//!
//! Per-field value transformations applied while a mapping is evaluated.
//!
//! Every transformation is total: it returns a value for any input, and a
//! misconfigured transformation (an invalid regex, a non-numeric input to
//! `number`) falls back to returning its input unchanged. Absent input
//! (`None`) models a resolution miss; string and number kinds pass it
//! through, `boolean` treats it as not-true and `timestamp` ignores it.
//!
//! ## Wire Shape
//!
//! Transformations are internally tagged on `type`:
//!
//! ```json
//! {"type": "regex", "pattern": "(\\d+)-(\\d+)", "replacement": "$2/$1"}
//! {"type": "number", "format": "currency"}
//! {"type": "boolean", "trueValue": "YES", "falseValue": "NO"}
//! ```
//!
//! The editor's `{"type": ..., "options": {...}}` record is accepted in the
//! same position and read with [`KaTransformation::from_record`].
//!
//! Regex replacements follow the editor's syntax: `$1`..`$99`, `$<name>`,
//! `$&` for the match, `` $` `` and `$'` for the text around it and `$$`
//! for a literal dollar. Anything else is copied as is.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{KaError, Result};

/// Output format of the `number` transformation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KaNumberFormat {
    #[default]
    Decimal,
    Integer,
    Currency,
    Percentage,
}

impl KaNumberFormat {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "decimal" => Some(KaNumberFormat::Decimal),
            "integer" => Some(KaNumberFormat::Integer),
            "currency" => Some(KaNumberFormat::Currency),
            "percentage" => Some(KaNumberFormat::Percentage),
            _ => None,
        }
    }

    fn format(&self, number: f64) -> f64 {
        match self {
            KaNumberFormat::Decimal => number,
            // Halves round toward positive infinity.
            KaNumberFormat::Integer => (number + 0.5).floor(),
            KaNumberFormat::Currency => (number * 100.0).round() / 100.0,
            KaNumberFormat::Percentage => number / 100.0,
        }
    }
}

/// Closed set of value transformations a mapping may carry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", try_from = "Value")]
pub enum KaTransformation {
    #[default]
    None,
    /// Stamps the evaluation instant; the input value is ignored.
    Timestamp {
        /// strftime format; ISO-8601 when absent or invalid.
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    Regex {
        pattern: String,
        replacement: String,
    },
    Uppercase,
    Lowercase,
    Number {
        format: KaNumberFormat,
    },
    /// A `null` label falls back to the JSON boolean.
    Boolean {
        #[serde(rename = "trueValue")]
        true_value: Value,
        #[serde(rename = "falseValue")]
        false_value: Value,
    },
}

fn label(value: Option<&Value>, default: bool) -> Value {
    match value {
        Some(Value::Null) | None => Value::Bool(default),
        Some(value) => value.clone(),
    }
}

// Tagged wire keys and their editor option names.
const WIRE_OPTIONS: &[(&str, &str, &str)] = &[
    ("timestamp", "format", "timestampFormat"),
    ("regex", "pattern", "regexPattern"),
    ("regex", "replacement", "regexReplacement"),
    ("number", "format", "numberFormat"),
    ("boolean", "trueValue", "booleanTrueValue"),
    ("boolean", "falseValue", "booleanFalseValue"),
];

impl TryFrom<Value> for KaTransformation {
    type Error = KaError;

    fn try_from(value: Value) -> Result<Self> {
        let Value::Object(mut record) = value else {
            return Err(KaError::validation("transformation must be an object"));
        };
        let kind = match record.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(KaError::validation("transformation has no string 'type'")),
        };
        if let Some(options) = record.remove("options") {
            return Self::from_record(&kind, &options);
        }

        let options: Map<String, Value> = WIRE_OPTIONS
            .iter()
            .filter(|(owner, _, _)| *owner == kind)
            .filter_map(|(_, wire, option)| {
                record.remove(*wire).map(|v| (option.to_string(), v))
            })
            .collect();
        Self::from_record(&kind, &Value::Object(options))
    }
}

impl KaTransformation {
    /// Regex transformation with the given pattern and replacement.
    pub fn regex(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        KaTransformation::Regex {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    pub fn number(format: KaNumberFormat) -> Self {
        KaTransformation::Number { format }
    }

    /// Boolean relabelling with explicit labels.
    pub fn boolean(true_value: impl Into<Value>, false_value: impl Into<Value>) -> Self {
        KaTransformation::Boolean {
            true_value: true_value.into(),
            false_value: false_value.into(),
        }
    }

    pub fn timestamp() -> Self {
        KaTransformation::Timestamp { format: None }
    }

    /// Tag name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            KaTransformation::None => "none",
            KaTransformation::Timestamp { .. } => "timestamp",
            KaTransformation::Regex { .. } => "regex",
            KaTransformation::Uppercase => "uppercase",
            KaTransformation::Lowercase => "lowercase",
            KaTransformation::Number { .. } => "number",
            KaTransformation::Boolean { .. } => "boolean",
        }
    }

    /// False only for kinds that read the wall clock.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, KaTransformation::Timestamp { .. })
    }

    /// Applies the transformation, reading the wall clock for `timestamp`.
    pub fn apply(&self, value: Option<Value>) -> Option<Value> {
        self.apply_at(value, Utc::now())
    }

    /// Applies the transformation with an explicit evaluation instant.
    pub fn apply_at(&self, value: Option<Value>, now: DateTime<Utc>) -> Option<Value> {
        match self {
            KaTransformation::None => value,
            KaTransformation::Timestamp { format } => {
                Some(Value::String(format_timestamp(now, format.as_deref())))
            }
            KaTransformation::Regex {
                pattern,
                replacement,
            } => {
                let value = value?;
                match Regex::new(pattern) {
                    Ok(re) => {
                        let text = coerce_string(&value);
                        let replaced = re.replace_all(&text, |caps: &Captures<'_>| {
                            expand_replacement(&re, caps, &text, replacement)
                        });
                        Some(Value::String(replaced.into_owned()))
                    }
                    Err(err) => {
                        log::debug!("regex transformation '{}' does not compile: {}", pattern, err);
                        Some(value)
                    }
                }
            }
            KaTransformation::Uppercase => {
                value.map(|v| Value::String(coerce_string(&v).to_uppercase()))
            }
            KaTransformation::Lowercase => {
                value.map(|v| Value::String(coerce_string(&v).to_lowercase()))
            }
            KaTransformation::Number { format } => {
                let value = value?;
                match coerce_number(&value).map(|n| format.format(n)) {
                    Some(number) if number.is_finite() => Some(number_value(number)),
                    _ => Some(value),
                }
            }
            KaTransformation::Boolean {
                true_value,
                false_value,
            } => {
                let is_true = value
                    .as_ref()
                    .map(|v| coerce_string(v).to_lowercase() == "true")
                    .unwrap_or(false);
                let chosen = if is_true { true_value } else { false_value };
                Some(label(Some(chosen), is_true))
            }
        }
    }

    /// Builds a transformation from the persisted `type` + `options` pair.
    ///
    /// Options use the editor's camelCase names: `regexPattern`,
    /// `regexReplacement`, `numberFormat`, `booleanTrueValue`,
    /// `booleanFalseValue` and `timestampFormat`. Missing options take the
    /// same defaults as the tagged wire shape; a `null` boolean label counts
    /// as missing.
    pub fn from_record(kind: &str, options: &Value) -> Result<Self> {
        let empty = Map::new();
        let options = match options {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(KaError::validation(
                    "transformation options must be an object",
                ))
            }
        };
        let text = |key: &str| options.get(key).and_then(Value::as_str).map(str::to_string);

        let transformation = match kind {
            "" | "none" => KaTransformation::None,
            "timestamp" => KaTransformation::Timestamp {
                format: text("timestampFormat").filter(|f| !f.is_empty()),
            },
            "regex" => KaTransformation::Regex {
                pattern: text("regexPattern").unwrap_or_default(),
                replacement: text("regexReplacement").unwrap_or_default(),
            },
            "uppercase" => KaTransformation::Uppercase,
            "lowercase" => KaTransformation::Lowercase,
            "number" => {
                let format = match text("numberFormat") {
                    Some(name) => KaNumberFormat::parse(&name).ok_or_else(|| {
                        KaError::validation(format!("unknown number format '{name}'"))
                    })?,
                    None => KaNumberFormat::default(),
                };
                KaTransformation::Number { format }
            }
            "boolean" => KaTransformation::Boolean {
                true_value: label(options.get("booleanTrueValue"), true),
                false_value: label(options.get("booleanFalseValue"), false),
            },
            other => {
                return Err(KaError::validation(format!(
                    "unknown transformation type '{other}'"
                )))
            }
        };
        Ok(transformation)
    }

    /// Inverse of [`KaTransformation::from_record`].
    pub fn to_record(&self) -> (&'static str, Value) {
        let mut options = Map::new();
        match self {
            KaTransformation::Timestamp { format: Some(format) } => {
                options.insert("timestampFormat".into(), Value::String(format.clone()));
            }
            KaTransformation::Regex {
                pattern,
                replacement,
            } => {
                options.insert("regexPattern".into(), Value::String(pattern.clone()));
                options.insert("regexReplacement".into(), Value::String(replacement.clone()));
            }
            KaTransformation::Number { format } => {
                options.insert("numberFormat".into(), serde_json::to_value(format).unwrap_or(Value::Null));
            }
            KaTransformation::Boolean {
                true_value,
                false_value,
            } => {
                options.insert("booleanTrueValue".into(), true_value.clone());
                options.insert("booleanFalseValue".into(), false_value.clone());
            }
            _ => {}
        }
        (self.kind(), Value::Object(options))
    }
}

/// Renders a JSON value as text for the string-based kinds.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Reads a JSON value as a finite number, if it has one.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    };
    number.filter(|n| n.is_finite())
}

// Integral results are emitted as JSON integers so `3.0` renders as `3`.
fn number_value(number: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if number.fract() == 0.0 && number.abs() < MAX_EXACT {
        return Value::from(number as i64);
    }
    serde_json::Number::from_f64(number)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Expands one match of `re` using the editor's `$` replacement syntax.
fn expand_replacement(re: &Regex, caps: &Captures<'_>, haystack: &str, replacement: &str) -> String {
    let Some(matched) = caps.get(0) else {
        return replacement.to_string();
    };
    let has_names = re.capture_names().flatten().next().is_some();
    let mut out = String::with_capacity(replacement.len());
    let mut rest = replacement;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let bytes = tail.as_bytes();
        let consumed = match bytes.first() {
            Some(b'$') => {
                out.push('$');
                1
            }
            Some(b'&') => {
                out.push_str(matched.as_str());
                1
            }
            Some(b'`') => {
                out.push_str(&haystack[..matched.start()]);
                1
            }
            Some(b'\'') => {
                out.push_str(&haystack[matched.end()..]);
                1
            }
            Some(b'<') if has_names => match tail.find('>') {
                Some(end) => {
                    if let Some(group) = caps.name(&tail[1..end]) {
                        out.push_str(group.as_str());
                    }
                    end + 1
                }
                None => {
                    out.push('$');
                    0
                }
            },
            Some(digit) if digit.is_ascii_digit() => match group_reference(bytes, caps.len() - 1) {
                Some((index, width)) => {
                    if let Some(group) = caps.get(index) {
                        out.push_str(group.as_str());
                    }
                    width
                }
                None => {
                    out.push('$');
                    0
                }
            },
            _ => {
                out.push('$');
                0
            }
        };
        rest = &tail[consumed..];
    }
    out.push_str(rest);
    out
}

// Two-digit references win when that group exists, as in `$12`.
fn group_reference(digits: &[u8], groups: usize) -> Option<(usize, usize)> {
    let first = usize::from(digits[0] - b'0');
    if let Some(second) = digits.get(1).filter(|b| b.is_ascii_digit()) {
        let index = first * 10 + usize::from(second - b'0');
        if (1..=groups).contains(&index) {
            return Some((index, 2));
        }
    }
    (1..=groups).contains(&first).then_some((first, 1))
}

fn format_timestamp(now: DateTime<Utc>, format: Option<&str>) -> String {
    if let Some(format) = format.filter(|f| !f.trim().is_empty()) {
        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if !items.iter().any(|item| matches!(item, Item::Error)) {
            let mut rendered = String::new();
            if write!(rendered, "{}", now.format_with_items(items.iter())).is_ok() {
                return rendered;
            }
        }
        log::debug!("timestamp format '{}' is invalid, using ISO-8601", format);
    }
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
