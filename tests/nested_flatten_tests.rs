//! Nested-value flattening across the JSON, TOML, XML and YAML parsers.

use confquill::document::value::{NestedValue, ValueKind};
use confquill::flatten::nested::flatten;
use confquill::formats::{parse_nested, FileFormat};

#[test]
fn test_json_nested_map() {
    let value = parse_nested(FileFormat::Json, r#"{"a":{"b":1,"c":2}}"#).unwrap();
    let flat = flatten(&value);

    assert_eq!(flat.len(), 2);
    assert_eq!(flat["a.b"].value, NestedValue::Int(1));
    assert_eq!(flat["a.c"].value, NestedValue::Int(2));
}

#[test]
fn test_json_empty_list_has_no_row() {
    let value = parse_nested(FileFormat::Json, r#"{"items": [], "name": "x"}"#).unwrap();
    let flat = flatten(&value);

    assert!(!flat.contains_key("items"));
    assert_eq!(flat.len(), 1);
}

#[test]
fn test_json_numeric_kinds() {
    let value = parse_nested(FileFormat::Json, r#"{"count": 3, "ratio": 3.0, "big": 1e3}"#).unwrap();
    let flat = flatten(&value);

    assert_eq!(flat["count"].kind(), Some(ValueKind::Integer));
    assert_eq!(flat["ratio"].kind(), Some(ValueKind::Number));
    assert_eq!(flat["big"].kind(), Some(ValueKind::Number));
}

#[test]
fn test_toml_tables_and_arrays() {
    let toml = r#"
title = "demo"

[owner]
name = "Tom"

[[servers]]
host = "a"

[[servers]]
host = "b"
ports = [80, 443]
"#;
    let value = parse_nested(FileFormat::Toml, toml).unwrap();
    let flat = flatten(&value);
    let keys: Vec<&String> = flat.keys().collect();

    assert_eq!(
        keys,
        vec![
            "title",
            "owner.name",
            "servers.0.host",
            "servers.1.host",
            "servers.1.ports.0",
            "servers.1.ports.1",
        ]
    );
    assert_eq!(flat["servers.1.ports.1"].keys, vec!["servers", "1", "ports", "1"]);
}

#[test]
fn test_xml_attributes_and_repeats() {
    let xml = r#"<config version="2">
  <db host="localhost">primary</db>
  <replica>r1</replica>
  <replica>r2</replica>
</config>"#;
    let value = parse_nested(FileFormat::Xml, xml).unwrap();
    let flat = flatten(&value);

    assert_eq!(flat["config.-version"].value, NestedValue::String("2".to_string()));
    assert_eq!(flat["config.db.-host"].value, NestedValue::String("localhost".to_string()));
    assert_eq!(flat["config.db.#text"].value, NestedValue::String("primary".to_string()));
    assert_eq!(flat["config.replica.0"].value, NestedValue::String("r1".to_string()));
    assert_eq!(flat["config.replica.1"].value, NestedValue::String("r2".to_string()));
}

#[test]
fn test_yaml_whole_document_as_nested() {
    let value = parse_nested(FileFormat::Yaml, "a:\n  - [1, 2]\n  - {b: true}\n").unwrap();
    let flat = flatten(&value);

    assert_eq!(flat["a.0"].kind(), Some(ValueKind::List));
    assert_eq!(flat["a.1.b"].value, NestedValue::Bool(true));
}

#[test]
fn test_flatten_is_stable_across_runs() {
    let value = parse_nested(FileFormat::Json, r#"{"z": {"y": [ {"x": 1} ]}, "a": null}"#).unwrap();
    assert_eq!(flatten(&value), flatten(&value));
    assert_eq!(flatten(&value)["a"].kind(), None);
}
