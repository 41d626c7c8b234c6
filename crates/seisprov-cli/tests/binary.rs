//! Integration test: run the `seis-prov-validate` binary on the shared
//! test documents.

use std::path::PathBuf;
use std::process::{Command, Output};

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seis-prov-validate"))
        .args(args)
        .env_remove("SEISPROV_SCHEMA")
        .env_remove("SEISPROV_STRICT")
        .output()
        .expect("binary runs")
}

fn testdata(path: &str) -> String {
    repo_root().join("testdata").join(path).display().to_string()
}

#[test]
fn test_valid_file_exits_zero() {
    let output = run(&[&testdata("valid/detailed_processing_chain.xml")]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "VALID SEIS-PROV FILE!");
}

#[test]
fn test_invalid_file_exits_one() {
    let output = run(&[&testdata("invalid/software_agent_missing_website.xml")]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Record 'seis_prov:sp001_sa_9345084' misses the following required attributes in the \
         SEIS-PROV namespace: 'website'"
    );
}

#[test]
fn test_strict_flag() {
    let file = testdata("valid/plain_prov.xml");
    assert_eq!(run(&[&file]).status.code(), Some(0));

    let output = run(&["--strict", &file]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "SEIS-PROV namespace not found in document!"
    );
}

#[test]
fn test_strict_environment_variable() {
    let output = Command::new(env!("CARGO_BIN_EXE_seis-prov-validate"))
        .arg(testdata("valid/plain_prov.xml"))
        .env_remove("SEISPROV_SCHEMA")
        .env("SEISPROV_STRICT", "true")
        .output()
        .expect("binary runs");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_json_output() {
    let output = run(&["--json", &testdata("invalid/several_bad_records.json")]);
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["valid"], false);
    assert_eq!(value["errors"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_definitions_tree_assembles() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("seis_prov.json");
    let definitions = repo_root().join("definitions").display().to_string();
    let output = run(&[
        "definitions",
        &definitions,
        "--output",
        &output_path.display().to_string(),
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stdout));

    let written = std::fs::read_to_string(&output_path).unwrap();
    let embedded = std::fs::read_to_string(repo_root().join("schemas/seis_prov.json")).unwrap();
    let written: serde_json::Value = serde_json::from_str(&written).unwrap();
    let embedded: serde_json::Value = serde_json::from_str(&embedded).unwrap();
    assert_eq!(written, embedded);
}

#[test]
fn test_missing_file_argument_fails() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
}
