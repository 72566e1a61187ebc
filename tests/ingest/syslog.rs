//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Kata.
//! The Kata project belongs to the Dunimd Team.

use kata::syslog::{parse, parse_cef, parse_stream_data};
use kata::{KaField, KaFieldMapping, KaSchema, KaTransformation, KaTransformationEngine};
use serde_json::json;

const LINE: &str = r#"<134>Oct 11 22:14:15 fw01 kernel: [origin ip="10.0.0.9" zone=dmz] {CEF:0|Acme|Firewall|4.2|100|Port scan blocked|7|src=10.0.0.1 dst=10.0.0.2 msg=repeated probes on 22}"#;

#[test]
fn test_syslog_header_fields() {
    let message = parse(LINE).unwrap();
    assert_eq!(message.priority, Some(134));
    assert_eq!(message.facility, Some(16));
    assert_eq!(message.severity, Some(6));
    assert_eq!(message.timestamp, "Oct 11 22:14:15");
    assert_eq!(message.hostname, "fw01");
    assert!(message.raw_message.starts_with("kernel:"));
}

#[test]
fn test_syslog_stream_data_strips_quotes() {
    let message = parse(LINE).unwrap();
    assert_eq!(message.stream_data["ip"], "10.0.0.9");
    assert_eq!(message.stream_data["zone"], "dmz");
    assert!(!message.stream_data.contains_key("origin"));
}

#[test]
fn test_syslog_cef_header_and_extensions() {
    let cef = parse(LINE).unwrap().cef.unwrap();
    assert_eq!(cef.header.version, "0");
    assert_eq!(cef.header.device_vendor, "Acme");
    assert_eq!(cef.header.device_product, "Firewall");
    assert_eq!(cef.header.device_version, "4.2");
    assert_eq!(cef.header.signature_id, "100");
    assert_eq!(cef.header.name, "Port scan blocked");
    assert_eq!(cef.header.severity, "7");
    assert_eq!(cef.extensions["src"], "10.0.0.1");
    assert_eq!(cef.extensions["msg"], "repeated probes on 22");
}

#[test]
fn test_syslog_without_priority() {
    let message = parse("Mar  3 01:02:03 db01 plain message").unwrap();
    assert_eq!(message.priority, None);
    assert_eq!(message.facility, None);
    assert!(message.stream_data.is_empty());
    assert!(message.cef.is_none());
    assert_eq!(message.raw_message, "plain message");
}

#[test]
fn test_syslog_helpers() {
    assert!(parse_cef("CEF:0|a|b").is_none());
    assert!(parse_stream_data("no brackets").is_empty());
}

#[test]
fn test_syslog_document_feeds_the_engine() {
    let document = parse(LINE).unwrap().to_document();
    let schemas = vec![
        KaSchema::new("event", "Event")
            .with_field(KaField::keyed("host", "host"))
            .with_field(KaField::keyed("vendor", "vendor"))
            .with_field(KaField::keyed("src", "source")),
        KaSchema::new("alert", "Alert").with_field(KaField::keyed("label", "label")),
    ];
    let mappings = vec![
        KaFieldMapping::from_json("root.hostname", "event", "host"),
        KaFieldMapping::from_json("root.cef.header.deviceVendor", "event", "vendor"),
        KaFieldMapping::from_json("root.cef.extensions.src", "event", "src"),
        KaFieldMapping::from_schema("event", "vendor", "alert", "label")
            .with_transformation(KaTransformation::Lowercase),
    ];

    let result = KaTransformationEngine::new().evaluate(&schemas, &mappings, &document);
    assert_eq!(
        result.to_value(),
        json!([
            {"host": "fw01", "vendor": "Acme", "source": "10.0.0.1"},
            {"label": "acme"}
        ])
    );
}
