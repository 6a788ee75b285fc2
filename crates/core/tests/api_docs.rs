#![allow(clippy::unwrap_used, clippy::expect_used)]

use pydemit_core::docs::emit_api_docs;
use pydemit_core::{DocsOptions, FsHost, TypeGraph};

const WIDGETS: &str = r#"{
  "namespaces": [{
    "name": "Widgets",
    "doc": "Manage widgets.",
    "service": { "title": "Widget Service" },
    "servers": [{ "url": "https://api.example.com" }],
    "models": [
      { "name": "Widget", "properties": [
        { "name": "id", "type": "string", "doc": "Widget id." },
        { "name": "weight", "type": "float64", "optional": true },
        { "name": "attributes", "type": { "record": "string" } },
        { "name": "parts", "type": { "array": "Part" } }
      ] },
      { "name": "Part", "properties": [{ "name": "sku", "type": "string" }] },
      { "name": "Error", "properties": [
        { "name": "code", "type": "int32" },
        { "name": "message", "type": "string" }
      ] }
    ],
    "interfaces": [{ "name": "WidgetOps", "operations": [
      { "name": "list", "verb": "get", "path": "/widgets", "doc": "List widgets.",
        "parameters": [{ "name": "limit", "in": "query", "type": "int32", "optional": true, "doc": "Page size." }],
        "responses": [
          { "statusCode": 200, "bodies": [{ "type": { "array": "Widget" } }] },
          { "statusCode": "*", "description": "An unexpected error.", "bodies": [{ "type": "Error" }] }
        ] },
      { "name": "create", "verb": "post", "path": "/widgets", "summary": "Create a widget",
        "body": { "type": "Widget", "contentTypes": ["application/json"] },
        "responses": [
          { "statusCode": 201, "bodies": [{ "type": "Widget" }] },
          { "statusCode": "*", "description": "An unexpected error.", "bodies": [{ "type": "Error" }] }
        ] },
      { "name": "upload", "verb": "put", "path": "/widgets/{id}/image",
        "parameters": [{ "name": "id", "in": "path", "type": "string" }],
        "body": { "type": "bytes", "contentTypes": ["image/png"] },
        "responses": [{ "statusCode": 204 }] }
    ] }]
  }]
}"#;

#[test]
fn test_widget_service_document() {
    let graph = TypeGraph::from_json(WIDGETS).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut host = FsHost::new(dir.path());
    let outputs = emit_api_docs(&graph, &DocsOptions::default(), &mut host).unwrap();
    assert_eq!(outputs.len(), 1);

    let out = std::fs::read_to_string(dir.path().join("Widgets.md")).unwrap();
    assert_eq!(out, outputs["Widgets.md"]);

    assert!(
        out.starts_with("# Widget Service API Reference\n\nManage widgets.\n\n## Server\n\n- `https://api.example.com`\n"),
        "got:\n{out}"
    );
    assert!(out.contains("## WidgetOps\n"), "got:\n{out}");
    assert!(out.contains("### list\n\n`GET /widgets`\n\nList widgets.\n"), "got:\n{out}");
    assert!(
        out.contains("| limit | query | `int32` | No | Page size. |"),
        "got:\n{out}"
    );
    assert!(out.contains("### Create a widget\n"), "got:\n{out}");
    assert!(
        out.contains(
            "| attributes | `object` | Yes | A map of string keys to string values. |"
        ),
        "got:\n{out}"
    );
    assert!(out.contains("| parts | `object[]` | Yes |  |"), "got:\n{out}");
    assert!(out.contains("| weight | `float64` | No |  |"), "got:\n{out}");
    assert!(
        out.contains("\"attributes\": {\n    \"key\": \"string\"\n  }"),
        "got:\n{out}"
    );
    assert!(out.contains("\"weight\": 0.0"), "got:\n{out}");

    // Binary upload: content type listed, no JSON example.
    assert!(
        out.contains("#### Request Body\n\nContent-Type: image/png\n\n#### Responses"),
        "got:\n{out}"
    );
    assert!(
        out.contains("##### 204 There is no content to send for this request, but the headers may be useful."),
        "got:\n{out}"
    );

    // The catch-all error is shared by two of three operations.
    assert!(
        out.contains("This operation also returns [common errors](#common-errors) (*)."),
        "got:\n{out}"
    );
    assert!(
        out.contains("## Common Errors\n\nThe following error responses apply to all operations in this API.\n\n##### * An unexpected error.\n"),
        "got:\n{out}"
    );
    assert_eq!(out.matches("##### * ").count(), 1, "got:\n{out}");
    assert!(out.ends_with('\n'));
}
