//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Kata.
//! The Kata project belongs to the Dunimd Team.

use std::fs;

use kata::{KaEngineConfig, KaError, KaField, KaSchema, KaTransformationEngine};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_config_defaults() {
    let config = KaEngineConfig::default();
    assert_eq!(config.default_value, json!(""));
    assert!(!config.root_path_fallback);
}

#[test]
fn test_config_from_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    fs::write(&path, r#"{"default_value": null, "root_path_fallback": true}"#).unwrap();

    let config = KaEngineConfig::from_path(&path).unwrap();
    assert!(config.root_path_fallback);
    // an explicit null is indistinguishable from an absent key
    assert_eq!(config.default_value, json!(""));
}

#[test]
fn test_config_from_yaml_file_drives_engine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.yaml");
    fs::write(&path, "default_value: missing\nroot_path_fallback: true\n").unwrap();

    let config = KaEngineConfig::from_path(&path).unwrap();
    let engine = KaTransformationEngine::with_config(config);
    let schemas = vec![KaSchema::new("s1", "Input")
        .with_field(KaField::new("f1", "host", "root.hostname"))
        .with_field(KaField::new("f2", "user", "root.user"))];

    let result = engine.evaluate(&schemas, &[], &json!({"hostname": "fw01"}));
    assert_eq!(result.to_value(), json!([{"host": "fw01", "user": "missing"}]));
}

#[test]
fn test_config_rejects_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.toml");
    fs::write(&path, "default_value = 1").unwrap();
    assert!(matches!(
        KaEngineConfig::from_path(&path),
        Err(KaError::Validation { .. })
    ));
}

#[test]
fn test_config_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        KaEngineConfig::from_path(dir.path().join("absent.json")),
        Err(KaError::Io(_))
    ));
}
