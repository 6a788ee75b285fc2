//! Pydantic module emitter.
//!
//! The pipeline is:
//! 1. Classify: operations -> usage map
//! 2. Collect: declared models, enums and named unions
//! 3. Bucket: input / output / roundtrip
//! 4. Codegen + Emit: one Python module per non-empty bucket
//! 5. Write: every module is rendered before the first file is written

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::emit::Emit;
use super::mapper::DeclNames;
use super::module::codegen_module;
use crate::config::PydanticOptions;
use crate::error::EmitError;
use crate::graph::{NamespaceId, Type, TypeGraph, TypeId};
use crate::host::{EmitHost, LineEnding};
use crate::usage::{Usage, classify};

/// Declared types of a program, grouped by kind in namespace order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredTypes {
    pub models: Vec<TypeId>,
    pub enums: Vec<TypeId>,
    pub unions: Vec<TypeId>,
}

impl DeclaredTypes {
    /// Models, then enums, then unions.
    pub fn all(&self) -> Vec<TypeId> {
        self.models
            .iter()
            .chain(&self.enums)
            .chain(&self.unions)
            .copied()
            .collect()
    }
}

/// Collect every emittable declaration, skipping the reserved namespace.
pub fn collect_types(graph: &TypeGraph) -> DeclaredTypes {
    let mut out = DeclaredTypes::default();
    let mut visited = HashSet::new();
    collect_namespace(graph, graph.global_namespace(), &mut visited, &mut out);
    out
}

fn collect_namespace(
    graph: &TypeGraph,
    ns: NamespaceId,
    visited: &mut HashSet<NamespaceId>,
    out: &mut DeclaredTypes,
) {
    if !visited.insert(ns) || graph.is_reserved_namespace(ns) {
        return;
    }
    let namespace = graph.namespace(ns);
    let declarable = |id: &&TypeId| is_declarable(graph, **id);
    out.models.extend(namespace.models.iter().filter(declarable));
    out.enums.extend(namespace.enums.iter().filter(declarable));
    out.unions.extend(namespace.unions.iter().filter(declarable));
    for child in &namespace.namespaces {
        collect_namespace(graph, *child, visited, out);
    }
}

/// Render the pydantic modules of a program: file name -> content.
///
/// Programs carrying error diagnostics render nothing.
pub fn render_pydantic(graph: &TypeGraph, options: &PydanticOptions) -> IndexMap<String, String> {
    let mut outputs = IndexMap::new();
    if graph.has_errors() {
        warn!("Program has errors, skipping pydantic emission.");
        return outputs;
    }

    let usage = classify(graph);
    let declared = collect_types(graph).all();
    let names = DeclNames::build(graph, &declared);

    let mut input = Vec::new();
    let mut output = Vec::new();
    let mut roundtrip = Vec::new();
    for id in declared {
        if options.constrain_to_used && !usage.contains(id) {
            debug!(name = %graph.qualified_name(id), "Skipping unused type.");
            continue;
        }
        match usage.usage(id) {
            Usage::Input => input.push(id),
            Usage::Output => output.push(id),
            Usage::Roundtrip => roundtrip.push(id),
        }
    }

    let buckets = [
        (&options.input_module_name, input),
        (&options.output_module_name, output),
        (&options.roundtrip_module_name, roundtrip),
    ];
    for (module_name, decls) in buckets {
        if decls.is_empty() {
            continue;
        }
        let content = codegen_module(graph, &names, &decls).emit();
        debug!(module = %module_name, decls = decls.len(), "Rendered module.");
        outputs.insert(format!("{module_name}.py"), content);
    }
    outputs
}

/// Render the pydantic modules and write them through `host`.
pub fn emit_pydantic(
    graph: &TypeGraph,
    options: &PydanticOptions,
    host: &mut dyn EmitHost,
) -> Result<IndexMap<String, String>, EmitError> {
    options.validate()?;
    let outputs = render_pydantic(graph, options);
    for (file, content) in &outputs {
        host.emit_file(Path::new(file), content, LineEnding::Lf)?;
    }
    info!(files = outputs.len(), "Emitted pydantic modules.");
    Ok(outputs)
}

/// Whether a type is a named declaration the emitter can render.
pub fn is_declarable(graph: &TypeGraph, id: TypeId) -> bool {
    match graph.get(id) {
        Type::Model(_) => !graph.is_structural_model(id),
        Type::Enum(_) => !graph.is_library_type(id),
        Type::Union(u) => u.name.is_some() && !graph.is_library_type(id),
        _ => false,
    }
}
