//! Read-only type graph handed over by the schema compiler.
//!
//! The graph is an arena of [`Type`] nodes, namespaces and HTTP operations.
//! It is loaded once from a program document and never mutated afterwards:
//!
//! 1. Parse: program JSON -> [`document::ProgramDoc`]
//! 2. Load: `ProgramDoc` -> [`TypeGraph`] (names resolved to ids, two passes)
//! 3. Query: emitters walk the graph through the accessors below
//!
//! Built-in scalars and the structural `Array`/`Record` templates live in the
//! reserved `TypeSpec` namespace.

pub mod document;
pub mod http;
mod loader;
pub mod types;

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::GraphError;
pub use document::Severity;
pub use http::{
    Container, HttpBody, HttpParameter, HttpResponse, HttpService, HttpVerb, Operation,
    OperationId, ParamLocation, Server, StatusCode,
};
pub use types::{
    Constraints, DefaultValue, Enum, EnumMember, EnumValue, IndexKey, Indexer, Intrinsic, Model,
    NamespaceId, Property, Scalar, Type, TypeId, Union, UnionVariant,
};

/// Name of the reserved namespace holding built-in types.
pub const RESERVED_NAMESPACE: &str = "TypeSpec";

/// A namespace node and the declarations made directly inside it.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    pub name: String,
    pub parent: Option<NamespaceId>,
    pub doc: Option<String>,
    /// Set when the namespace is an HTTP service; carries the optional title.
    pub service: Option<Option<String>>,
    pub servers: Vec<Server>,
    pub namespaces: Vec<NamespaceId>,
    pub models: Vec<TypeId>,
    pub enums: Vec<TypeId>,
    pub unions: Vec<TypeId>,
    pub scalars: Vec<TypeId>,
    pub operations: Vec<OperationId>,
    pub(crate) declared: IndexMap<String, TypeId>,
}

/// A diagnostic reported by the host compiler.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
}

/// The resolved program graph.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    pub(crate) types: Vec<Type>,
    pub(crate) namespaces: Vec<Namespace>,
    pub(crate) operations: Vec<Operation>,
    pub(crate) global: NamespaceId,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl TypeGraph {
    /// Parse and resolve a program document.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let doc = document::ProgramDoc::from_json(json)?;
        loader::load(&doc)
    }

    /// Read, parse and resolve a program document from disk.
    pub fn from_path(path: &Path) -> Result<Self, GraphError> {
        let json = std::fs::read_to_string(path).map_err(|source| GraphError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0]
    }

    pub fn model(&self, id: TypeId) -> Option<&Model> {
        match self.get(id) {
            Type::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.0]
    }

    pub fn global_namespace(&self) -> NamespaceId {
        self.global
    }

    pub fn operation(&self, id: OperationId) -> &Operation {
        &self.operations[id.0]
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether the host reported any error-severity diagnostic.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Namespace path segments from the global namespace down, e.g. `["Billing", "V1"]`.
    pub fn namespace_path(&self, id: NamespaceId) -> Vec<&str> {
        let mut segments = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(id);
        while let Some(ns_id) = current {
            if !visited.insert(ns_id) {
                break;
            }
            let ns = self.namespace(ns_id);
            if !ns.name.is_empty() {
                segments.push(ns.name.as_str());
            }
            current = ns.parent;
        }
        segments.reverse();
        segments
    }

    /// Dotted namespace name: `"Billing.V1"`, or `""` for the global namespace.
    pub fn namespace_name(&self, id: NamespaceId) -> String {
        self.namespace_path(id).join(".")
    }

    /// `TypeSpec` and everything nested below it.
    pub fn is_reserved_namespace(&self, id: NamespaceId) -> bool {
        self.namespace_path(id).first() == Some(&RESERVED_NAMESPACE)
    }

    /// Whether a type belongs to the reserved namespace.
    pub fn is_library_type(&self, id: TypeId) -> bool {
        self.get(id)
            .namespace()
            .is_some_and(|ns| self.is_reserved_namespace(ns))
    }

    /// Anonymous models and reserved templates such as `Array` or `Record`.
    pub fn is_structural_model(&self, id: TypeId) -> bool {
        match self.get(id) {
            Type::Model(m) => m.name.is_empty() || self.is_library_type(id),
            _ => false,
        }
    }

    /// Fully qualified name of a declared type, e.g. `"Billing.Address"`.
    pub fn qualified_name(&self, id: TypeId) -> String {
        let name = self.get(id).name().unwrap_or_default();
        match self.get(id).namespace() {
            Some(ns) => {
                let ns_name = self.namespace_name(ns);
                if ns_name.is_empty() {
                    name.to_string()
                } else {
                    format!("{ns_name}.{name}")
                }
            }
            None => name.to_string(),
        }
    }

    /// Operations declared directly in a namespace (including its interfaces).
    pub fn operations_in(&self, id: NamespaceId) -> &[OperationId] {
        &self.namespace(id).operations
    }

    /// Every namespace marked as a service, each with the operations of its subtree.
    pub fn http_services(&self) -> Vec<HttpService> {
        let mut services = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![self.global];
        while let Some(ns_id) = stack.pop() {
            if !visited.insert(ns_id) {
                continue;
            }
            let ns = self.namespace(ns_id);
            if let Some(title) = &ns.service {
                services.push(HttpService {
                    namespace: ns_id,
                    title: title.clone(),
                    operations: self.operations_in_subtree(ns_id),
                });
            }
            stack.extend(ns.namespaces.iter().rev().copied());
        }
        services
    }

    /// Operations declared anywhere below `root`, depth first.
    pub fn operations_in_subtree(&self, root: NamespaceId) -> Vec<OperationId> {
        let mut ops = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(ns_id) = stack.pop() {
            if !visited.insert(ns_id) {
                continue;
            }
            let ns = self.namespace(ns_id);
            ops.extend(ns.operations.iter().copied());
            stack.extend(ns.namespaces.iter().rev().copied());
        }
        ops
    }

    /// Walk a scalar's base chain to its root, stopping on cycles.
    pub fn scalar_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(scalar_id) = current {
            if chain.contains(&scalar_id) {
                break;
            }
            match self.get(scalar_id) {
                Type::Scalar(s) => {
                    chain.push(scalar_id);
                    current = s.base;
                }
                _ => break,
            }
        }
        chain
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn find_model(graph: &TypeGraph, ns: NamespaceId, name: &str) -> TypeId {
        *graph
            .namespace(ns)
            .models
            .iter()
            .find(|id| graph.get(**id).name() == Some(name))
            .expect("model not found")
    }

    #[test]
    fn test_namespace_paths_and_reserved() {
        let graph = TypeGraph::from_json(
            r#"{
              "namespaces": [{
                "name": "Billing",
                "namespaces": [{ "name": "V1", "models": [{ "name": "Invoice" }] }]
              }]
            }"#,
        )
        .unwrap();
        let billing = graph.namespace(graph.global_namespace()).namespaces[1];
        let v1 = graph.namespace(billing).namespaces[0];
        assert_eq!(graph.namespace_name(v1), "Billing.V1");
        assert!(!graph.is_reserved_namespace(v1));

        let invoice = find_model(&graph, v1, "Invoice");
        assert_eq!(graph.qualified_name(invoice), "Billing.V1.Invoice");
        assert!(!graph.is_library_type(invoice));
    }

    #[test]
    fn test_builtin_scalar_chain() {
        let graph = TypeGraph::from_json(
            r#"{ "models": [{ "name": "M", "properties": [{ "name": "n", "type": "int8" }] }] }"#,
        )
        .unwrap();
        let m = find_model(&graph, graph.global_namespace(), "M");
        let prop_ty = graph.model(m).unwrap().properties["n"].ty;
        assert!(graph.is_library_type(prop_ty));
        let names: Vec<_> = graph
            .scalar_chain(prop_ty)
            .into_iter()
            .filter_map(|id| graph.get(id).name())
            .collect();
        assert_eq!(names, ["int8", "int16", "int32", "int64", "integer", "numeric"]);
    }

    #[test]
    fn test_http_services_collect_subtree_operations() {
        let graph = TypeGraph::from_json(
            r#"{
              "namespaces": [{
                "name": "Store",
                "service": { "title": "Pet Store" },
                "operations": [{ "name": "ping", "verb": "get", "path": "/ping" }],
                "namespaces": [{
                  "name": "Pets",
                  "interfaces": [{
                    "name": "Pets",
                    "operations": [{ "name": "list", "verb": "get", "path": "/pets" }]
                  }]
                }]
              }]
            }"#,
        )
        .unwrap();
        let services = graph.http_services();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].title.as_deref(), Some("Pet Store"));
        let names: Vec<_> = services[0]
            .operations
            .iter()
            .map(|id| graph.operation(*id).name.as_str())
            .collect();
        assert_eq!(names, ["ping", "list"]);
        assert_eq!(graph.operation(services[0].operations[1]).group_name(), "Pets");
    }

    #[test]
    fn test_has_errors() {
        let graph = TypeGraph::from_json(
            r#"{ "diagnostics": [{ "severity": "warning", "message": "meh" }] }"#,
        )
        .unwrap();
        assert!(!graph.has_errors());

        let graph = TypeGraph::from_json(
            r#"{ "diagnostics": [{ "severity": "error", "code": "x", "message": "bad" }] }"#,
        )
        .unwrap();
        assert!(graph.has_errors());
    }
}
