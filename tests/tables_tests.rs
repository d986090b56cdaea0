//! Table runs over real files: resolution, loading and batch failure handling.

use confquill::error::Error;
use confquill::flatten::RowValue;
use confquill::tables::{run, BatchReport, Options, Record, Source, Table};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn collect(table: Table, source: Source, options: Options) -> (Vec<Record>, BatchReport) {
    let mut records = Vec::new();
    let report = run(table, &source, &options, |r| records.push(r)).unwrap();
    (records, report)
}

fn glob_in(dir: &TempDir) -> Source {
    Source::Paths(vec![format!("{}/*", dir.path().display())])
}

#[test]
fn test_yml_key_value_records() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "app.yml", "# app\nname: demo\nlimits:\n  cpu: 2\n");

    let (records, report) = collect(Table::YmlKeyValue, glob_in(&dir), Options::default());

    assert_eq!(report.files, 1);
    assert_eq!(report.rows, 2);
    match &records[1] {
        Record::Tree { path, row } => {
            assert_eq!(path, &file.display().to_string());
            assert_eq!(row.key_path, "limits.cpu");
            assert_eq!(row.value, RowValue::Scalar("2".to_string()));
        }
        other => panic!("unexpected record {:?}", other),
    }

    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["path"], file.display().to_string());
    assert_eq!(json["keys"], serde_json::json!(["name"]));
    assert_eq!(json["pre_comments"], serde_json::json!(["app"]));
}

#[test]
fn test_skip_and_continue_on_bad_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.json", r#"{"x": 1}"#);
    let bad = write(dir.path(), "b.json", r#"{"x": "#);
    write(dir.path(), "c.json", r#"{"y": {"z": true}}"#);

    let (records, report) = collect(Table::JsonKeyValue, glob_in(&dir), Options::default());

    assert_eq!(report.files, 3);
    assert_eq!(report.rows, 2);
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], Error::Parse { .. }));
    assert_eq!(report.failures[0].path(), Some(bad.display().to_string()));

    let keys: Vec<String> = records
        .iter()
        .map(|r| match r {
            Record::Nested { key, .. } => key.clone(),
            other => panic!("unexpected record {:?}", other),
        })
        .collect();
    assert_eq!(keys, vec!["x", "y.z"]);
}

#[test]
fn test_extension_filter_and_gzip() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "plain.toml", "a = 1\n");
    write(dir.path(), "notes.txt", "not toml");
    let gz = dir.path().join("packed.toml.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&gz).unwrap(), Compression::default());
    encoder.write_all(b"b = 2.5\n").unwrap();
    encoder.finish().unwrap();

    let (records, report) = collect(Table::TomlKeyValue, glob_in(&dir), Options::default());

    assert_eq!(report.files, 2);
    assert!(report.is_success());
    let tags: Vec<serde_json::Value> = records
        .iter()
        .map(|r| serde_json::to_value(r).unwrap()["tag"].clone())
        .collect();
    assert!(tags.contains(&serde_json::json!("integer")));
    assert!(tags.contains(&serde_json::json!("number")));
}

#[test]
fn test_exact_file_source_skips_resolution() {
    let dir = TempDir::new().unwrap();
    let odd = write(dir.path(), "settings.cfg", "[main]\nkey = value\n");

    let (records, report) = collect(Table::IniSection, Source::File(odd), Options::default());

    assert_eq!(report.files, 1);
    let sections: Vec<&str> = records
        .iter()
        .map(|r| match r {
            Record::IniSection { section, .. } => section.as_str(),
            other => panic!("unexpected record {:?}", other),
        })
        .collect();
    assert_eq!(sections, vec!["DEFAULT", "main"]);
}

#[test]
fn test_missing_exact_file_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.yml");

    let (records, report) = collect(Table::YmlFile, Source::File(missing), Options::default());

    assert!(records.is_empty());
    assert!(matches!(report.failures[0], Error::Io { .. }));
}

#[test]
fn test_ini_key_value_interpolation_and_nesting() {
    let dir = TempDir::new().unwrap();
    let ini = "\
[paths]
root = /srv

[app]
; where data lives
data = ${paths.root}/data
; tuning knobs
opts =
  level = 3
  mode = fast
";
    let file = write(dir.path(), "app.ini", ini);

    let (records, _) = collect(Table::IniKeyValue, Source::File(file.clone()), Options::default());
    let rows: Vec<(String, String, String, Option<String>)> = records
        .into_iter()
        .map(|r| match r {
            Record::IniKey {
                section,
                key,
                value,
                comment,
                ..
            } => (section, key, value, comment),
            other => panic!("unexpected record {:?}", other),
        })
        .collect();
    let expected: Vec<(String, String, String, Option<String>)> = vec![
        ("paths".into(), "root".into(), "/srv".into(), None),
        (
            "app".into(),
            "data".into(),
            "/srv/data".into(),
            Some("; where data lives".into()),
        ),
        ("app".into(), "opts.level".into(), "3".into(), None),
        ("app".into(), "opts.mode".into(), "fast".into(), None),
    ];
    assert_eq!(rows, expected);

    let raw = Options {
        interpolate_ini: false,
        expand_nested_ini: false,
    };
    let (records, _) = collect(Table::IniKeyValue, Source::File(file), raw);
    let (values, comments): (Vec<String>, Vec<Option<String>>) = records
        .into_iter()
        .filter_map(|r| match r {
            Record::IniKey { value, comment, .. } => Some((value, comment)),
            _ => None,
        })
        .unzip();
    assert_eq!(values[1], "${paths.root}/data");
    assert_eq!(values[2], "\nlevel = 3\nmode = fast");
    assert_eq!(comments[2].as_deref(), Some("; tuning knobs"));
}

#[test]
fn test_file_tables_emit_json_content() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "doc.xml", "<root><item>1</item><item>2</item></root>");
    write(dir.path(), "doc.yaml", "list: [1, two]\n");

    let (xml, _) = collect(Table::XmlFile, glob_in(&dir), Options::default());
    let (yml, _) = collect(Table::YmlFile, glob_in(&dir), Options::default());

    match (&xml[0], &yml[0]) {
        (Record::File { content: x, .. }, Record::File { content: y, .. }) => {
            assert_eq!(x, &serde_json::json!({"root": {"item": ["1", "2"]}}));
            assert_eq!(y, &serde_json::json!({"list": [1, "two"]}));
        }
        other => panic!("unexpected records {:?}", other),
    }
}

#[test]
fn test_resolution_errors_abort_run() {
    let result = run(
        Table::XmlKeyValue,
        &Source::Paths(vec!["/nonexistent/confquill/[bad".to_string()]),
        &Options::default(),
        |_| {},
    );
    assert!(matches!(result, Err(Error::InvalidGlob { .. })));
}
