//! Module assembly: declaration ordering and import derivation.

use std::collections::HashSet;

use tracing::debug;

use super::codegen::{codegen_enum, codegen_model, codegen_union};
use super::mapper::{DeclNames, TypeMapper};
use super::types::{FieldValue, PyDecl, PyImport, PyModule, PyPrimitive, PyType};
use crate::graph::{Type, TypeGraph, TypeId};

/// Build one module from the declarations of a bucket.
///
/// Enums come first, then union aliases, then model classes with every base
/// class ahead of the classes extending it.
pub fn codegen_module(graph: &TypeGraph, names: &DeclNames, decls: &[TypeId]) -> PyModule {
    let mapper = TypeMapper::new(graph, names);
    let mut out = Vec::with_capacity(decls.len());

    for id in decls {
        if let Type::Enum(e) = graph.get(*id) {
            out.push(PyDecl::Enum(codegen_enum(names.name_of(graph, *id), e)));
        }
    }
    for id in decls {
        if let Type::Union(u) = graph.get(*id) {
            out.push(PyDecl::Alias(codegen_union(
                &mapper,
                names.name_of(graph, *id),
                u,
            )));
        }
    }
    for id in order_models(graph, decls) {
        if let Type::Model(m) = graph.get(id) {
            out.push(PyDecl::Class(codegen_model(
                graph,
                names,
                &mapper,
                names.name_of(graph, id),
                m,
            )));
        }
    }

    let imports = derive_imports(&out);
    debug!(decls = out.len(), imports = imports.len(), "Assembled module.");
    PyModule {
        imports,
        decls: out,
    }
}

/// Models of `decls`, each preceded by its base when the base is in the same set.
pub fn order_models(graph: &TypeGraph, decls: &[TypeId]) -> Vec<TypeId> {
    let models: Vec<TypeId> = decls
        .iter()
        .copied()
        .filter(|id| matches!(graph.get(*id), Type::Model(_)))
        .collect();
    let in_set: HashSet<TypeId> = models.iter().copied().collect();
    let mut visited = HashSet::new();
    let mut ordered = Vec::with_capacity(models.len());

    for id in &models {
        // Collect the in-set base chain, stopping at a cycle.
        let mut chain = Vec::new();
        let mut current = Some(*id);
        while let Some(model_id) = current {
            if !visited.insert(model_id) {
                break;
            }
            chain.push(model_id);
            current = graph
                .model(model_id)
                .and_then(|m| m.base)
                .filter(|base| in_set.contains(base));
        }
        ordered.extend(chain.into_iter().rev());
    }
    ordered
}

/// Scan rendered declarations for the names they use.
fn derive_imports(decls: &[PyDecl]) -> Vec<PyImport> {
    let mut optional = false;
    let mut union = false;
    let mut list = false;
    let mut dict = false;
    let mut any = false;
    let mut datetime = false;
    let mut timedelta = false;
    let mut field = false;
    let mut base_model = false;
    let mut enum_bases: Vec<&'static str> = Vec::new();

    let mut scan = |ty: &PyType| match ty {
        PyType::Optional(_) => optional = true,
        PyType::Union(_) => union = true,
        PyType::List(_) => list = true,
        PyType::Dict(_) => dict = true,
        PyType::Primitive(PyPrimitive::Any) => any = true,
        PyType::Primitive(PyPrimitive::Datetime) => datetime = true,
        PyType::Primitive(PyPrimitive::Timedelta) => timedelta = true,
        PyType::Primitive(_) | PyType::ForwardRef(_) | PyType::None => {}
    };

    for decl in decls {
        match decl {
            PyDecl::Enum(e) => {
                let base = e.base.as_str();
                if !enum_bases.contains(&base) {
                    enum_bases.push(base);
                }
            }
            PyDecl::Alias(a) => a.value.walk(&mut scan),
            PyDecl::Class(c) => {
                base_model = true;
                for f in &c.fields {
                    f.annotation.walk(&mut scan);
                    if matches!(f.value, FieldValue::Field(_)) {
                        field = true;
                    }
                }
            }
        }
    }

    let mut imports = Vec::new();
    let typing: Vec<&'static str> = [
        (optional, "Optional"),
        (union, "Union"),
        (list, "List"),
        (dict, "Dict"),
        (any, "Any"),
    ]
    .into_iter()
    .filter_map(|(used, name)| used.then_some(name))
    .collect();
    if !typing.is_empty() {
        imports.push(PyImport {
            module: "typing",
            names: typing,
        });
    }
    if !enum_bases.is_empty() {
        imports.push(PyImport {
            module: "enum",
            names: enum_bases,
        });
    }
    let dates: Vec<&'static str> = [(datetime, "datetime"), (timedelta, "timedelta")]
        .into_iter()
        .filter_map(|(used, name)| used.then_some(name))
        .collect();
    if !dates.is_empty() {
        imports.push(PyImport {
            module: "datetime",
            names: dates,
        });
    }
    if base_model {
        let mut names = vec!["BaseModel"];
        if field {
            names.push("Field");
        }
        imports.push(PyImport {
            module: "pydantic",
            names,
        });
    }
    imports
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pydantic::emit::Emit;

    fn global_decls(graph: &TypeGraph) -> Vec<TypeId> {
        let ns = graph.namespace(graph.global_namespace());
        ns.models
            .iter()
            .chain(&ns.enums)
            .chain(&ns.unions)
            .copied()
            .collect()
    }

    fn emit_global(json: &str) -> String {
        let graph = TypeGraph::from_json(json).unwrap();
        let decls = global_decls(&graph);
        let names = DeclNames::build(&graph, &decls);
        codegen_module(&graph, &names, &decls).emit()
    }

    #[test]
    fn test_base_before_derived() {
        let graph = TypeGraph::from_json(
            r#"{ "models": [
              { "name": "Puppy", "extends": "Dog" },
              { "name": "Dog", "extends": "Animal" },
              { "name": "Cat", "extends": "Animal" },
              { "name": "Animal" }
            ] }"#,
        )
        .unwrap();
        let decls = global_decls(&graph);
        let order: Vec<&str> = order_models(&graph, &decls)
            .into_iter()
            .filter_map(|id| graph.get(id).name())
            .collect();
        assert_eq!(order, ["Animal", "Dog", "Puppy", "Cat"]);
    }

    #[test]
    fn test_base_cycle_terminates() {
        let graph = TypeGraph::from_json(
            r#"{ "models": [{ "name": "A", "extends": "B" }, { "name": "B", "extends": "A" }] }"#,
        )
        .unwrap();
        let decls = global_decls(&graph);
        assert_eq!(order_models(&graph, &decls).len(), 2);
    }

    #[test]
    fn test_declaration_kind_order() {
        let out = emit_global(
            r#"{
              "models": [{ "name": "Shape", "properties": [{ "name": "kind", "type": "Kind" }] }],
              "unions": [{ "name": "Value", "variants": ["string", "int32"] }],
              "enums": [{ "name": "Kind", "members": [{ "name": "circle" }] }]
            }"#,
        );
        let kind = out.find("class Kind(StrEnum):").unwrap();
        let value = out.find("Value = Union[str, int]").unwrap();
        let shape = out.find("class Shape(BaseModel):").unwrap();
        assert!(kind < value && value < shape, "got:\n{out}");
    }

    #[test]
    fn test_import_order() {
        let out = emit_global(
            r#"{
              "enums": [
                { "name": "Level", "members": [{ "name": "low", "value": 1 }] },
                { "name": "Mode", "members": [{ "name": "fast" }] }
              ],
              "models": [{ "name": "Job", "properties": [
                { "name": "tags", "type": { "record": "string" } },
                { "name": "steps", "type": { "array": "string" } },
                { "name": "meta", "type": "unknown" },
                { "name": "at", "type": "utcDateTime" },
                { "name": "every", "type": "duration", "optional": true },
                { "name": "name", "type": "string", "minLength": 1 },
                { "name": "either", "type": { "union": ["string", "int32"] } }
              ] }]
            }"#,
        );
        let expected = "from typing import Optional, Union, List, Dict, Any\n\
                        from enum import IntEnum, StrEnum\n\
                        from datetime import datetime, timedelta\n\
                        from pydantic import BaseModel, Field\n";
        assert!(out.starts_with(expected), "got:\n{out}");
    }

    #[test]
    fn test_minimal_imports() {
        let out = emit_global(r#"{ "models": [{ "name": "Empty" }] }"#);
        assert_eq!(out, "from pydantic import BaseModel\n\n\nclass Empty(BaseModel):\n    pass\n");
    }
}
