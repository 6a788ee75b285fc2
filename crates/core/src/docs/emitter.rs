//! HTTP API reference emitter.
//!
//! The pipeline is:
//! 1. Discover: declared services, or the global namespace when none is declared
//! 2. Render: one Markdown document per service
//! 3. Name: resolve the `output-file` template per service
//! 4. Write: every document is rendered before the first file is written

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::markdown::render_service;
use crate::config::DocsOptions;
use crate::error::EmitError;
use crate::graph::{HttpService, TypeGraph};
use crate::host::{EmitHost, LineEnding};

/// Services to document. A program with operations but no declared service
/// is documented as one implicit service rooted at the global namespace.
pub fn discover_services(graph: &TypeGraph) -> Vec<HttpService> {
    let services = graph.http_services();
    if !services.is_empty() {
        return services;
    }
    let global = graph.global_namespace();
    let operations = graph.operations_in_subtree(global);
    if operations.is_empty() {
        return Vec::new();
    }
    debug!(
        operations = operations.len(),
        "No service declared, using the global namespace."
    );
    vec![HttpService {
        namespace: global,
        title: None,
        operations,
    }]
}

/// Resolve the output file name of a service from the template.
///
/// `{service-name}` is the dotted namespace name (`api` for the global
/// namespace); `{service-name-if-multiple}` expands to the same name only when
/// several services are emitted. Empty path segments are dropped.
pub fn resolve_output_file(template: &str, service_name: &str, multiple: bool) -> String {
    let if_multiple = if multiple { service_name } else { "" };
    let resolved = template
        .replace("{service-name-if-multiple}", if_multiple)
        .replace("{service-name}", service_name);
    resolved
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Render the reference documents of a program: file name -> content.
///
/// Programs carrying error diagnostics render nothing.
pub fn render_api_docs(graph: &TypeGraph, options: &DocsOptions) -> IndexMap<String, String> {
    let mut outputs = IndexMap::new();
    if graph.has_errors() {
        warn!("Program has errors, skipping API docs emission.");
        return outputs;
    }

    let services = discover_services(graph);
    let multiple = services.len() > 1;
    for service in &services {
        let name = graph.namespace_name(service.namespace);
        let name = if name.is_empty() { "api".to_string() } else { name };
        let file = resolve_output_file(&options.output_file, &name, multiple);
        let content = render_service(graph, service);
        debug!(service = %name, file = %file, operations = service.operations.len(), "Rendered service docs.");
        if outputs.insert(file.clone(), content).is_some() {
            warn!(file = %file, "Output file name collides with another service, keeping the last one.");
        }
    }
    outputs
}

/// Render the reference documents and write them through `host`.
pub fn emit_api_docs(
    graph: &TypeGraph,
    options: &DocsOptions,
    host: &mut dyn EmitHost,
) -> Result<IndexMap<String, String>, EmitError> {
    options.validate()?;
    let outputs = render_api_docs(graph, options);
    for (file, content) in &outputs {
        host.emit_file(Path::new(file), content, LineEnding::Lf)?;
    }
    info!(files = outputs.len(), "Emitted API docs.");
    Ok(outputs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    const TWO_SERVICES: &str = r#"{
      "namespaces": [
        { "name": "Pets", "service": { "title": "Pets" },
          "operations": [{ "name": "list", "verb": "get", "path": "/pets" }] },
        { "name": "Store", "service": {},
          "namespaces": [{ "name": "V1",
            "operations": [{ "name": "order", "verb": "post", "path": "/orders" }] }] }
      ]
    }"#;

    #[test]
    fn test_resolve_output_file() {
        assert_eq!(resolve_output_file("{service-name}.md", "Pets", false), "Pets.md");
        assert_eq!(
            resolve_output_file("docs/{service-name-if-multiple}/api.md", "Pets", false),
            "docs/api.md"
        );
        assert_eq!(
            resolve_output_file("docs/{service-name-if-multiple}/api.md", "Pets", true),
            "docs/Pets/api.md"
        );
    }

    #[test]
    fn test_one_document_per_service() {
        let graph = TypeGraph::from_json(TWO_SERVICES).unwrap();
        let outputs = render_api_docs(&graph, &DocsOptions::default());
        assert_eq!(outputs.keys().collect::<Vec<_>>(), ["Pets.md", "Store.md"]);
        assert!(outputs["Store.md"].starts_with("# Store API Reference\n"));
        assert!(outputs["Store.md"].contains("`POST /orders`"));
        assert!(!outputs["Pets.md"].contains("/orders"));
    }

    #[test]
    fn test_implicit_global_service() {
        let graph = TypeGraph::from_json(
            r#"{ "operations": [{ "name": "ping", "verb": "get", "path": "/ping" }] }"#,
        )
        .unwrap();
        let mut host = MemoryHost::new();
        let outputs = emit_api_docs(&graph, &DocsOptions::default(), &mut host).unwrap();
        assert_eq!(outputs.keys().collect::<Vec<_>>(), ["api.md"]);
        assert!(host.get("api.md").unwrap().contains("### ping"));
    }

    #[test]
    fn test_no_operations_no_output() {
        let graph = TypeGraph::from_json(r#"{ "models": [{ "name": "A" }] }"#).unwrap();
        assert!(render_api_docs(&graph, &DocsOptions::default()).is_empty());
    }

    #[test]
    fn test_errors_skip_emission() {
        let graph = TypeGraph::from_json(
            r#"{ "operations": [{ "name": "ping", "verb": "get" }],
                 "diagnostics": [{ "severity": "error", "message": "bad" }] }"#,
        )
        .unwrap();
        let mut host = MemoryHost::new();
        let outputs = emit_api_docs(&graph, &DocsOptions::default(), &mut host).unwrap();
        assert!(outputs.is_empty());
        assert!(host.files.is_empty());
    }

    #[test]
    fn test_empty_template_is_rejected() {
        let graph = TypeGraph::from_json(TWO_SERVICES).unwrap();
        let options = DocsOptions {
            output_file: " ".to_string(),
        };
        let mut host = MemoryHost::new();
        assert!(emit_api_docs(&graph, &options, &mut host).is_err());
    }
}
