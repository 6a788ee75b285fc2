//! Graph type -> Python annotation mapping.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::warn;

use super::types::{PyPrimitive, PyType};
use super::utils::sanitize_identifier;
use crate::graph::{Intrinsic, Type, TypeGraph, TypeId};

/// Root scalar name -> Python primitive.
fn scalar_primitive(name: &str) -> Option<PyPrimitive> {
    let primitive = match name {
        "string" | "url" | "plainDate" | "plainTime" => PyPrimitive::Str,
        "boolean" => PyPrimitive::Bool,
        "int8" | "int16" | "int32" | "int64" | "uint8" | "uint16" | "uint32" | "uint64"
        | "integer" | "safeint" => PyPrimitive::Int,
        "float32" | "float64" | "float" | "numeric" | "decimal" | "decimal128" => {
            PyPrimitive::Float
        }
        "bytes" => PyPrimitive::Bytes,
        "utcDateTime" | "offsetDateTime" => PyPrimitive::Datetime,
        "duration" => PyPrimitive::Timedelta,
        _ => return None,
    };
    Some(primitive)
}

/// Emitted Python names of declared types.
///
/// Names are bare unless two declarations in different namespaces share one, in
/// which case each is qualified with its namespace path (`Billing_Address`).
#[derive(Debug, Clone, Default)]
pub struct DeclNames {
    names: HashMap<TypeId, String>,
}

impl DeclNames {
    pub fn build(graph: &TypeGraph, decls: &[TypeId]) -> Self {
        let mut by_name: IndexMap<&str, Vec<TypeId>> = IndexMap::new();
        for id in decls {
            if let Some(name) = graph.get(*id).name() {
                by_name.entry(name).or_default().push(*id);
            }
        }

        let mut names = HashMap::new();
        for (name, ids) in by_name {
            if ids.len() == 1 {
                names.insert(ids[0], sanitize_identifier(name));
                continue;
            }
            for id in ids {
                let mut segments: Vec<&str> = graph
                    .get(id)
                    .namespace()
                    .map(|ns| graph.namespace_path(ns))
                    .unwrap_or_default();
                segments.push(name);
                let qualified = sanitize_identifier(&segments.join("_"));
                warn!(
                    name,
                    qualified = %qualified,
                    "Declaration name is shared across namespaces, qualifying."
                );
                names.insert(id, qualified);
            }
        }
        Self { names }
    }

    /// Emitted name of a type, falling back to its sanitized bare name.
    pub fn name_of(&self, graph: &TypeGraph, id: TypeId) -> String {
        match self.names.get(&id) {
            Some(name) => name.clone(),
            None => sanitize_identifier(graph.get(id).name().unwrap_or_default()),
        }
    }
}

/// Maps graph types to Python annotations.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    graph: &'a TypeGraph,
    names: &'a DeclNames,
}

impl<'a> TypeMapper<'a> {
    pub fn new(graph: &'a TypeGraph, names: &'a DeclNames) -> Self {
        Self { graph, names }
    }

    /// Map a type, recording the names of referenced declarations into `refs`.
    pub fn map(&self, id: TypeId, refs: &mut IndexSet<String>) -> PyType {
        match self.graph.get(id) {
            Type::Scalar(_) => self
                .graph
                .scalar_chain(id)
                .into_iter()
                .find_map(|s| self.graph.get(s).name().and_then(scalar_primitive))
                .map(PyType::Primitive)
                .unwrap_or(PyType::ANY),
            Type::Model(model) => {
                if let Some(element) = model.array_element() {
                    return PyType::List(Box::new(self.map(element, refs)));
                }
                if let Some(value) = model.map_value() {
                    return PyType::Dict(Box::new(self.map(value, refs)));
                }
                if self.graph.is_structural_model(id) {
                    return PyType::ANY;
                }
                self.forward_ref(id, refs)
            }
            Type::Enum(e) => {
                if e.name.is_empty() {
                    return PyType::ANY;
                }
                self.forward_ref(id, refs)
            }
            Type::Union(union) => {
                let mut variants: Vec<PyType> = union
                    .variants
                    .iter()
                    .map(|v| self.map(v.ty, refs))
                    .collect();
                match variants.len() {
                    0 => PyType::ANY,
                    1 => variants.remove(0),
                    _ => PyType::Union(variants),
                }
            }
            Type::Intrinsic(Intrinsic::Null) => PyType::None,
            Type::Intrinsic(_) => PyType::ANY,
            Type::StringLiteral(_) => PyType::Primitive(PyPrimitive::Str),
            Type::NumberLiteral(n) => {
                let integral = n.is_i64()
                    || n.is_u64()
                    || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0);
                PyType::Primitive(if integral {
                    PyPrimitive::Int
                } else {
                    PyPrimitive::Float
                })
            }
            Type::BooleanLiteral(_) => PyType::Primitive(PyPrimitive::Bool),
        }
    }

    fn forward_ref(&self, id: TypeId, refs: &mut IndexSet<String>) -> PyType {
        let name = self.names.name_of(self.graph, id);
        refs.insert(name.clone());
        PyType::ForwardRef(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pydantic::emit::Emit;

    /// Map every property of model `M` in the global namespace.
    fn map_props(json: &str) -> Vec<(String, String, Vec<String>)> {
        let graph = TypeGraph::from_json(json).unwrap();
        let global = graph.namespace(graph.global_namespace());
        let m = *global
            .models
            .iter()
            .find(|id| graph.get(**id).name() == Some("M"))
            .unwrap();
        let names = DeclNames::build(&graph, &global.models);
        let mapper = TypeMapper::new(&graph, &names);
        graph
            .model(m)
            .unwrap()
            .properties
            .values()
            .map(|p| {
                let mut refs = IndexSet::new();
                let ann = mapper.map(p.ty, &mut refs).emit();
                (p.name.clone(), ann, refs.into_iter().collect())
            })
            .collect()
    }

    fn annotation<'a>(mapped: &'a [(String, String, Vec<String>)], name: &str) -> &'a str {
        &mapped.iter().find(|(n, _, _)| n == name).unwrap().1
    }

    #[test]
    fn test_scalar_mapping() {
        let mapped = map_props(
            r#"{
              "scalars": [{ "name": "Email", "extends": "string" }, { "name": "Opaque" }],
              "models": [{ "name": "M", "properties": [
                { "name": "s", "type": "string" },
                { "name": "u", "type": "url" },
                { "name": "b", "type": "boolean" },
                { "name": "i", "type": "uint16" },
                { "name": "f", "type": "decimal128" },
                { "name": "raw", "type": "bytes" },
                { "name": "at", "type": "utcDateTime" },
                { "name": "ttl", "type": "duration" },
                { "name": "email", "type": "Email" },
                { "name": "opaque", "type": "Opaque" }
              ] }]
            }"#,
        );
        assert_eq!(annotation(&mapped, "s"), "str");
        assert_eq!(annotation(&mapped, "u"), "str");
        assert_eq!(annotation(&mapped, "b"), "bool");
        assert_eq!(annotation(&mapped, "i"), "int");
        assert_eq!(annotation(&mapped, "f"), "float");
        assert_eq!(annotation(&mapped, "raw"), "bytes");
        assert_eq!(annotation(&mapped, "at"), "datetime");
        assert_eq!(annotation(&mapped, "ttl"), "timedelta");
        assert_eq!(annotation(&mapped, "email"), "str");
        assert_eq!(annotation(&mapped, "opaque"), "Any");
    }

    #[test]
    fn test_container_and_reference_mapping() {
        let mapped = map_props(
            r#"{
              "enums": [{ "name": "Color" }],
              "models": [
                { "name": "Child" },
                { "name": "M", "properties": [
                  { "name": "items", "type": { "array": "string" } },
                  { "name": "tags", "type": { "record": { "array": "int32" } } },
                  { "name": "child", "type": "Child" },
                  { "name": "color", "type": "Color" },
                  { "name": "anon", "type": { "model": { "properties": [] } } }
                ] }
              ]
            }"#,
        );
        assert_eq!(annotation(&mapped, "items"), "List[str]");
        assert_eq!(annotation(&mapped, "tags"), "Dict[str, List[int]]");
        assert_eq!(annotation(&mapped, "child"), "\"Child\"");
        assert_eq!(mapped.iter().find(|m| m.0 == "child").unwrap().2, ["Child"]);
        assert_eq!(annotation(&mapped, "color"), "\"Color\"");
        assert_eq!(annotation(&mapped, "anon"), "Any");
    }

    #[test]
    fn test_union_and_literal_mapping() {
        let mapped = map_props(
            r#"{
              "models": [{ "name": "M", "properties": [
                { "name": "nullable", "type": { "union": ["string", { "intrinsic": "null" }] } },
                { "name": "single", "type": { "union": ["int32"] } },
                { "name": "empty", "type": { "union": [] } },
                { "name": "lit", "type": { "string": "on" } },
                { "name": "whole", "type": { "number": 2 } },
                { "name": "frac", "type": { "number": 2.5 } },
                { "name": "flag", "type": { "boolean": true } },
                { "name": "whatever", "type": "unknown" }
              ] }]
            }"#,
        );
        assert_eq!(annotation(&mapped, "nullable"), "Union[str, None]");
        assert_eq!(annotation(&mapped, "single"), "int");
        assert_eq!(annotation(&mapped, "empty"), "Any");
        assert_eq!(annotation(&mapped, "lit"), "str");
        assert_eq!(annotation(&mapped, "whole"), "int");
        assert_eq!(annotation(&mapped, "frac"), "float");
        assert_eq!(annotation(&mapped, "flag"), "bool");
        assert_eq!(annotation(&mapped, "whatever"), "Any");
    }

    #[test]
    fn test_colliding_names_are_qualified() {
        let graph = TypeGraph::from_json(
            r#"{
              "namespaces": [
                { "name": "Billing", "models": [{ "name": "Address" }] },
                { "name": "Shipping", "models": [{ "name": "Address" }, { "name": "Label" }] }
              ]
            }"#,
        )
        .unwrap();
        let global = graph.namespace(graph.global_namespace());
        let decls: Vec<TypeId> = global.namespaces[1..]
            .iter()
            .flat_map(|ns| graph.namespace(*ns).models.clone())
            .collect();
        let names = DeclNames::build(&graph, &decls);
        let emitted: Vec<String> = decls.iter().map(|id| names.name_of(&graph, *id)).collect();
        assert_eq!(emitted, ["Billing_Address", "Shipping_Address", "Label"]);
    }
}
