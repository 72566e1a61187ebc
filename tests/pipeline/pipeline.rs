//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Kata.
//! The Kata project belongs to the Dunimd Team.

use std::fs;

use kata::{
    KaError, KaField, KaFieldMapping, KaIO, KaPipeline, KaSchema, KaSchemaId, KaTransformation,
    KaTransformationEngine, KaVersion,
};
use serde_json::json;
use tempfile::tempdir;

fn orders() -> KaPipeline {
    let mut pipeline = KaPipeline::new("orders").with_source_document(json!({
        "order": {"id": "o-1", "paid": "true", "total": "19.5"}
    }));
    pipeline
        .add_schema(
            KaSchema::new("raw", "Raw")
                .with_field(KaField::new("id", "id", "order.id"))
                .with_field(KaField::new("paid", "paid", "order.paid")),
        )
        .unwrap();
    pipeline
        .add_schema(
            KaSchema::new("view", "View")
                .with_field(KaField::keyed("ref", "reference"))
                .with_field(KaField::keyed("status", "status")),
        )
        .unwrap();
    pipeline
        .add_mapping(KaFieldMapping::from_json("order.id", "raw", "id"))
        .unwrap();
    pipeline
        .add_mapping(KaFieldMapping::from_json("order.paid", "raw", "paid"))
        .unwrap();
    pipeline
        .add_mapping(
            KaFieldMapping::from_schema("raw", "id", "view", "ref")
                .with_transformation(KaTransformation::Uppercase),
        )
        .unwrap();
    pipeline
        .add_mapping(
            KaFieldMapping::from_schema("raw", "paid", "view", "status")
                .with_transformation(KaTransformation::boolean("PAID", "OPEN")),
        )
        .unwrap();
    pipeline
}

#[test]
fn test_pipeline_evaluates_its_source_document() {
    let pipeline = orders();
    let result = pipeline.evaluate(&KaTransformationEngine::new());
    assert_eq!(
        result.final_output().map(|m| serde_json::Value::Object(m.clone())),
        Some(json!({"reference": "O-1", "status": "PAID"}))
    );
}

#[test]
fn test_pipeline_version_tracks_edits() {
    let mut pipeline = orders();
    // two schemas and four mappings
    assert_eq!(pipeline.version(), KaVersion::new(1, 0, 6));

    let key = KaFieldMapping::from_schema("raw", "id", "view", "ref").key();
    pipeline.set_transformation(&key, None).unwrap();
    assert_eq!(pipeline.version(), KaVersion::new(1, 0, 7));

    let result = pipeline.evaluate(&KaTransformationEngine::new());
    assert_eq!(result.final_output().unwrap()["reference"], json!("o-1"));
}

#[test]
fn test_pipeline_rejects_cycles_and_skips() {
    let mut pipeline = orders();
    let before = pipeline.version();

    let backwards = KaFieldMapping::from_schema("view", "ref", "raw", "id");
    let err = pipeline.add_mapping(backwards).unwrap_err();
    assert!(err.is_mapping_rejection());
    assert_eq!(pipeline.mappings().len(), 4);
    assert_eq!(pipeline.version(), before);
}

#[test]
fn test_pipeline_field_removal_prunes_mappings() {
    let mut pipeline = orders();

    let pruned = pipeline
        .update_schema_fields(&KaSchemaId::from("raw"), vec![KaField::new("id", "id", "order.id")])
        .unwrap();

    assert_eq!(pruned, 2);
    assert_eq!(pipeline.mappings().len(), 2);
    assert_eq!(
        pipeline.schema(&KaSchemaId::from("raw")).unwrap().version,
        KaVersion::new(1, 0, 1)
    );
    assert!(pipeline.validate().is_valid());

    let result = pipeline.evaluate(&KaTransformationEngine::new());
    assert_eq!(result.final_output().unwrap()["status"], json!(""));
}

#[test]
fn test_pipeline_remove_mapping() {
    let mut pipeline = orders();
    let key = KaFieldMapping::from_json("order.paid", "raw", "paid").key();

    let removed = pipeline.remove_mapping(&key).unwrap();
    assert_eq!(removed.target_field_id.as_str(), "paid");
    assert!(matches!(
        pipeline.remove_mapping(&key),
        Err(KaError::Pipeline { .. })
    ));
}

#[test]
fn test_pipeline_reorder_surfaces_adjacency_issues() {
    let mut pipeline = orders();
    pipeline
        .reorder_schema(&KaSchemaId::from("view"), &KaSchemaId::from("raw"))
        .unwrap();

    let order: Vec<&str> = pipeline.schemas().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(order, vec!["view", "raw"]);
    assert!(!pipeline.validate().is_valid());
    assert!(pipeline.validate().into_result().is_err());
}

#[test]
fn test_pipeline_unknown_schema_errors() {
    let mut pipeline = orders();
    let ghost = KaSchemaId::from("ghost");
    assert!(pipeline.remove_schema(&ghost).is_err());
    assert!(pipeline.update_schema_fields(&ghost, Vec::new()).is_err());
}

#[test]
fn test_pipeline_definition_files_round_trip() {
    let dir = tempdir().unwrap();
    let pipeline = orders();

    for name in ["orders.json", "orders.yaml"] {
        let path = dir.path().join(name);
        KaIO::save_pipeline(&path, &pipeline).unwrap();
        let loaded = KaIO::load_pipeline(&path).unwrap();
        assert_eq!(loaded, pipeline);
    }
}

#[test]
fn test_pipeline_definition_from_editor_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("greeting.json");
    fs::write(
        &path,
        json!({
            "name": "greeting",
            "version": "2.1.0",
            "schemas": [
                {"id": "s1", "name": "In", "fields": [{"id": "f1", "key": "name", "path": "name"}]},
                {"id": "s2", "name": "Out", "fields": [{"id": "f2", "key": "greeting"}]}
            ],
            "mappings": [
                {"sourceType": "json", "sourceReference": "name", "targetSchemaId": "s1", "targetFieldId": "f1"},
                {"sourceType": "schema", "sourceSchemaId": "s1", "sourceFieldId": "f1",
                 "targetSchemaId": "s2", "targetFieldId": "f2", "transformation": {"type": "uppercase"}}
            ],
            "sourceJson": {"name": "ada"}
        })
        .to_string(),
    )
    .unwrap();

    let pipeline = KaIO::load_pipeline(&path).unwrap();
    assert_eq!(pipeline.version(), KaVersion::new(2, 1, 0));
    let result = pipeline.evaluate(&KaTransformationEngine::new());
    assert_eq!(result.final_output().unwrap()["greeting"], json!("ADA"));
}

#[test]
fn test_pipeline_definition_with_transformation_options() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prices.yaml");
    fs::write(
        &path,
        r#"name: prices
schemas:
  - id: s1
    name: In
    fields: [{id: f1, key: price, path: price}, {id: f2, key: code, path: code}]
  - id: s2
    name: Out
    fields: [{id: f3, key: price}, {id: f4, key: code}, {id: f5, key: paid}]
mappings:
  - {sourceType: json, sourceReference: price, targetSchemaId: s1, targetFieldId: f1}
  - {sourceType: json, sourceReference: code, targetSchemaId: s1, targetFieldId: f2}
  - sourceType: schema
    sourceSchemaId: s1
    sourceFieldId: f1
    targetSchemaId: s2
    targetFieldId: f3
    transformation: {type: number, options: {numberFormat: currency}}
  - sourceType: schema
    sourceSchemaId: s1
    sourceFieldId: f2
    targetSchemaId: s2
    targetFieldId: f4
    transformation: {type: regex, options: {regexPattern: '(\d+)', regexReplacement: '#$1px'}}
  - sourceType: schema
    sourceSchemaId: s1
    sourceFieldId: f2
    targetSchemaId: s2
    targetFieldId: f5
    transformation: {type: boolean, options: {booleanTrueValue: null, booleanFalseValue: unpaid}}
sourceJson: {price: 4.5678, code: a12}
"#,
    )
    .unwrap();

    let pipeline = KaIO::load_pipeline(&path).unwrap();
    let result = pipeline.evaluate(&KaTransformationEngine::new());
    let output = result.final_output().unwrap();
    assert_eq!(output["price"], json!(4.57));
    assert_eq!(output["code"], json!("a#12px"));
    assert_eq!(output["paid"], json!("unpaid"));
}

#[test]
fn test_pipeline_unknown_transformation_option_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad_format.json");
    fs::write(
        &path,
        json!({
            "name": "bad",
            "schemas": [{"id": "s1", "name": "In", "fields": [{"id": "f1", "key": "a"}]}],
            "mappings": [{"sourceType": "json", "sourceReference": "a", "targetSchemaId": "s1",
                          "targetFieldId": "f1",
                          "transformation": {"type": "number", "options": {"numberFormat": "roman"}}}]
        })
        .to_string(),
    )
    .unwrap();
    assert!(KaIO::load_pipeline(&path).is_err());
}

#[test]
fn test_pipeline_invalid_definition_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(
        &path,
        "name: bad\nschemas:\n  - id: s1\n    name: In\n    fields: [{id: f1, key: a}]\nmappings:\n  - sourceType: json\n    sourceReference: a\n    targetSchemaId: s9\n    targetFieldId: f1\n",
    )
    .unwrap();
    assert!(matches!(
        KaIO::load_pipeline(&path),
        Err(KaError::Validation { .. })
    ));
}
