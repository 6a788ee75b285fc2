#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use pydemit_cli::run_cli;

const PROGRAM: &str = r#"{
  "namespaces": [{
    "name": "Todo",
    "service": { "title": "Todo" },
    "models": [
      { "name": "NewItem", "properties": [{ "name": "title", "type": "string" }] },
      { "name": "Item", "properties": [
        { "name": "id", "type": "int64" },
        { "name": "title", "type": "string" }
      ] }
    ],
    "operations": [{
      "name": "add", "verb": "post", "path": "/items",
      "body": { "type": "NewItem" },
      "responses": [{ "statusCode": 201, "bodies": [{ "type": "Item" }] }]
    }]
  }]
}"#;

fn args(list: &[&str]) -> Vec<String> {
    std::iter::once("pydemit")
        .chain(list.iter().copied())
        .map(String::from)
        .collect()
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn test_emit_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let program = write(dir.path(), "program.json", PROGRAM);
    let config = write(
        dir.path(),
        "pydemit.yaml",
        "emit: [pydantic, http-api-docs]\noptions:\n  pydantic:\n    input-module-name: requests\n",
    );
    let out = dir.path().join("out");

    let code = run_cli(args(&[
        "emit",
        "--program",
        &program,
        "--config",
        &config,
        "--output-dir",
        &out.display().to_string(),
    ]));
    assert_eq!(code, 0);

    let requests = fs::read_to_string(out.join("pydantic/requests.py")).unwrap();
    assert!(requests.contains("class NewItem(BaseModel):"), "got:\n{requests}");
    let responses = fs::read_to_string(out.join("pydantic/output_types.py")).unwrap();
    assert!(responses.contains("class Item(BaseModel):"), "got:\n{responses}");
    let docs = fs::read_to_string(out.join("http-api-docs/Todo.md")).unwrap();
    assert!(docs.starts_with("# Todo API Reference\n"), "got:\n{docs}");
}

#[test]
fn test_emitter_flag_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let program = write(dir.path(), "program.json", PROGRAM);
    let out = dir.path().join("out");

    let code = run_cli(args(&[
        "emit",
        "--program",
        &program,
        "--output-dir",
        &out.display().to_string(),
        "--emitter",
        "http-api-docs",
    ]));
    assert_eq!(code, 0);
    assert!(out.join("http-api-docs/Todo.md").exists());
    assert!(!out.join("pydantic").exists());
}

#[test]
fn test_program_with_errors_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let program = write(
        dir.path(),
        "program.json",
        r#"{ "models": [{ "name": "A" }], "diagnostics": [{ "severity": "error", "code": "bad", "message": "broken" }] }"#,
    );
    let out = dir.path().join("out");
    let code = run_cli(args(&[
        "emit",
        "--program",
        &program,
        "--output-dir",
        &out.display().to_string(),
    ]));
    assert_eq!(code, 1);
    assert!(!out.exists());
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let program = write(dir.path(), "program.json", PROGRAM);
    let config = write(
        dir.path(),
        "pydemit.yaml",
        "options:\n  pydantic:\n    output-module-name: \"not valid\"\n",
    );
    let code = run_cli(args(&["emit", "--program", &program, "--config", &config]));
    assert_eq!(code, 1);
}

#[test]
fn test_unknown_emitter_and_missing_program() {
    assert_eq!(run_cli(args(&["emit", "--program", "p.json", "--emitter", "openapi"])), 2);
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json").display().to_string();
    assert_eq!(run_cli(args(&["classify", "--program", &missing])), 1);
}

#[test]
fn test_classify() {
    let dir = tempfile::tempdir().unwrap();
    let program = write(dir.path(), "program.json", PROGRAM);
    assert_eq!(run_cli(args(&["classify", "--program", &program])), 0);
}
