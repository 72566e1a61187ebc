//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Kata.
//! The Kata project belongs to the Dunimd Team.

use chrono::{DateTime, TimeZone, Utc};
use kata::transform::{KaNumberFormat, KaTransformation};
use proptest::prelude::*;
use serde_json::{json, Value};

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

#[test]
fn test_case_transformations() {
    assert_eq!(
        KaTransformation::Uppercase.apply(Some(json!("Hello"))),
        Some(json!("HELLO"))
    );
    assert_eq!(
        KaTransformation::Lowercase.apply(Some(json!("Hello"))),
        Some(json!("hello"))
    );
    assert_eq!(
        KaTransformation::Uppercase.apply(Some(json!(true))),
        Some(json!("TRUE"))
    );
    assert_eq!(KaTransformation::Uppercase.apply(None), None);
}

#[test]
fn test_number_formats() {
    let percentage = KaTransformation::number(KaNumberFormat::Percentage);
    assert_eq!(percentage.apply(Some(json!("150"))), Some(json!(1.5)));

    let integer = KaTransformation::number(KaNumberFormat::Integer);
    assert_eq!(integer.apply(Some(json!("3.456"))), Some(json!(3)));

    let decimal = KaTransformation::number(KaNumberFormat::Decimal);
    assert_eq!(decimal.apply(Some(json!("2.25"))), Some(json!(2.25)));
}

#[test]
fn test_number_falls_back_to_input() {
    let number = KaTransformation::number(KaNumberFormat::Decimal);
    assert_eq!(number.apply(Some(json!("abc"))), Some(json!("abc")));
    assert_eq!(number.apply(Some(json!({"a": 1}))), Some(json!({"a": 1})));
    assert_eq!(number.apply(None), None);
}

#[test]
fn test_boolean_relabelling() {
    let t = KaTransformation::boolean("YES", "NO");
    assert_eq!(t.apply(Some(json!("true"))), Some(json!("YES")));
    assert_eq!(t.apply(Some(json!("TRUE"))), Some(json!("YES")));
    assert_eq!(t.apply(Some(json!(true))), Some(json!("YES")));
    assert_eq!(t.apply(Some(json!("false"))), Some(json!("NO")));
    assert_eq!(t.apply(Some(json!("anything"))), Some(json!("NO")));
    assert_eq!(t.apply(None), Some(json!("NO")));
}

#[test]
fn test_boolean_defaults_from_wire() {
    let t: KaTransformation = serde_json::from_value(json!({"type": "boolean"})).unwrap();
    assert_eq!(t.apply(Some(json!("True"))), Some(json!(true)));
    assert_eq!(t.apply(Some(json!(0))), Some(json!(false)));
}

#[test]
fn test_regex_groups_and_invalid_patterns() {
    let swap = KaTransformation::regex(r"(\w+)@(\w+)", "$2 at $1");
    assert_eq!(swap.apply(Some(json!("ada@home"))), Some(json!("home at ada")));

    let broken = KaTransformation::regex("(", "x");
    assert_eq!(broken.apply(Some(json!(42))), Some(json!(42)));
}

#[test]
fn test_timestamp_uses_the_given_instant() {
    let t = KaTransformation::timestamp();
    assert_eq!(
        t.apply_at(Some(json!("ignored")), noon()),
        Some(json!("2026-10-18T12:00:00.000Z"))
    );
    assert!(!t.is_deterministic());
    assert!(KaTransformation::Uppercase.is_deterministic());
}

#[test]
fn test_timestamp_wall_clock_is_iso() {
    let Some(Value::String(stamp)) = KaTransformation::timestamp().apply(None) else {
        panic!("timestamp must produce a string");
    };
    assert!(stamp.ends_with('Z'));
    assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
}

#[test]
fn test_records_from_editor_columns() {
    let t = KaTransformation::from_record(
        "regex",
        &json!({"regexPattern": "-", "regexReplacement": "/"}),
    )
    .unwrap();
    assert_eq!(t.apply(Some(json!("2024-01-02"))), Some(json!("2024/01/02")));

    let t = KaTransformation::from_record("number", &json!({"numberFormat": "currency"})).unwrap();
    assert_eq!(t, KaTransformation::number(KaNumberFormat::Currency));

    assert_eq!(
        KaTransformation::from_record("none", &Value::Null).unwrap(),
        KaTransformation::None
    );
    assert!(KaTransformation::from_record("rot13", &json!({})).is_err());
    assert!(KaTransformation::from_record("number", &json!({"numberFormat": "hex"})).is_err());
}

#[test]
fn test_wire_shape_is_tagged() {
    let t = KaTransformation::number(KaNumberFormat::Integer);
    assert_eq!(
        serde_json::to_value(&t).unwrap(),
        json!({"type": "number", "format": "integer"})
    );
    let back: KaTransformation =
        serde_json::from_value(json!({"type": "regex", "pattern": "a", "replacement": "b"})).unwrap();
    assert_eq!(back, KaTransformation::regex("a", "b"));
}

proptest! {
    #[test]
    fn none_is_identity(s in ".*", n in any::<i64>()) {
        prop_assert_eq!(KaTransformation::None.apply(Some(json!(s.clone()))), Some(json!(s)));
        prop_assert_eq!(KaTransformation::None.apply(Some(json!(n))), Some(json!(n)));
    }

    #[test]
    fn uppercase_is_idempotent(s in "[a-zA-Z0-9 ]{0,24}") {
        let once = KaTransformation::Uppercase.apply(Some(json!(s)));
        let twice = KaTransformation::Uppercase.apply(once.clone());
        prop_assert_eq!(once, twice);
    }
}
