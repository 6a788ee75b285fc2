pub mod classify;
pub mod emit;

use std::path::Path;

use pydemit_core::graph::Severity;
use pydemit_core::{GraphError, TypeGraph};
use tracing::debug;

/// Load a program document and print its diagnostics to stderr.
pub(crate) fn load_program(path: &Path) -> Result<TypeGraph, GraphError> {
    let graph = TypeGraph::from_path(path)?;
    debug!(path = %path.display(), diagnostics = graph.diagnostics().len(), "Loaded program.");
    for diagnostic in graph.diagnostics() {
        let severity = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &diagnostic.code {
            Some(code) => eprintln!("{severity}[{code}]: {}", diagnostic.message),
            None => eprintln!("{severity}: {}", diagnostic.message),
        }
    }
    Ok(graph)
}
