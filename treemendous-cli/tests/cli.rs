use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn data_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("temp file written");
    file
}

const PEOPLE: &str = r#"[
    {"name": "a", "type": "X"},
    {"name": "b", "type": "X"},
    {"name": "c", "type": "Y"}
]"#;

#[test]
fn renders_flat_tree() {
    let data = data_file(PEOPLE);
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg(data.path());

    cmd.assert()
        .success()
        .stdout(predicate::eq("├─ • a\n├─ • b\n└─ • c\n"));
}

#[test]
fn renders_grouped_tree() {
    let data = data_file(PEOPLE);
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg(data.path()).arg("--nodes").arg("nodes group by type");

    cmd.assert().success().stdout(predicate::eq(
        "├─ ⊞ type: X\n│ ├─ • a\n│ └─ • b\n└─ ⊞ type: Y\n  └─ • c\n",
    ));
}

#[test]
fn renders_json() {
    let data = data_file(PEOPLE);
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg(data.path())
        .arg("--nodes")
        .arg("nodes group by type as items")
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let rendered: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(
        rendered,
        serde_json::json!([
            {"type": "X", "items": [{"name": "a", "type": "X"}, {"name": "b", "type": "X"}]},
            {"type": "Y", "items": [{"name": "c", "type": "Y"}]}
        ])
    );
}

#[test]
fn renders_yaml() {
    let data = data_file(PEOPLE);
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg(data.path())
        .arg("-n")
        .arg("nodes group by type")
        .arg("-f")
        .arg("yaml");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("type: X").and(predicate::str::contains("name: c")));
}

#[test]
fn binds_object_fields_by_name() {
    let data = data_file(r#"{"people": [{"title": "p"}], "other": [{"title": "o"}]}"#);
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg(data.path())
        .arg("--nodes")
        .arg("people")
        .arg("--label")
        .arg("title");

    cmd.assert().success().stdout(predicate::eq("└─ • p\n"));
}

#[test]
fn reads_config_file() {
    let data = data_file(PEOPLE);
    let config = data_file("[tree]\nnodes = \"nodes group by type\"\n\n[render]\nlabel_field = \"type\"\n");
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg(data.path()).arg("--config").arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("├─ ⊞ type: X\n│ ├─ • X\n"));
}

#[test]
fn parse_only_prints_expression() {
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg("--parse-only")
        .arg("--nodes")
        .arg("nodes | filter:f group by type as items");

    cmd.assert().success().stdout(predicate::eq(
        "base: nodes | filter:f\ngroup key: type\nchildren field: items\n",
    ));
}

#[test]
fn malformed_expression_fails() {
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg("--parse-only").arg("--nodes").arg("   ");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Expected expression in the form of"));
}

#[test]
fn missing_data_file_fails() {
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg("/nonexistent/data.json");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn scalar_document_fails() {
    let data = data_file("42");
    let mut cmd = cargo_bin_cmd!("treemendous");
    cmd.arg(data.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Expected a JSON array"));
}
