//! Reachability-based usage classification.
//!
//! Every named type reachable from an operation's parameters or request body is
//! tagged `input`; every named type reachable from a response body is tagged
//! `output`. A type carrying both tags is `roundtrip`.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::graph::{NamespaceId, Operation, Type, TypeGraph, TypeId};

/// Usage category of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Usage {
    Input,
    Output,
    Roundtrip,
}

impl Usage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Usage::Input => "input",
            Usage::Output => "output",
            Usage::Roundtrip => "roundtrip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Input,
    Output,
}

/// Roles a type was reached from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleSet {
    pub input: bool,
    pub output: bool,
}

impl RoleSet {
    fn insert(&mut self, role: Role) {
        match role {
            Role::Input => self.input = true,
            Role::Output => self.output = true,
        }
    }

    pub fn usage(&self) -> Usage {
        match (self.input, self.output) {
            (true, true) => Usage::Roundtrip,
            (true, false) => Usage::Input,
            (false, true) => Usage::Output,
            // Never stored; an entry always carries at least one role.
            (false, false) => Usage::Roundtrip,
        }
    }
}

/// Usage tags of one classification run, in first-reached order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageMap {
    roles: IndexMap<TypeId, RoleSet>,
}

impl UsageMap {
    pub fn contains(&self, id: TypeId) -> bool {
        self.roles.contains_key(&id)
    }

    pub fn roles(&self, id: TypeId) -> Option<RoleSet> {
        self.roles.get(&id).copied()
    }

    /// Usage of a type; unreferenced types default to `roundtrip`.
    pub fn usage(&self, id: TypeId) -> Usage {
        self.roles
            .get(&id)
            .map(RoleSet::usage)
            .unwrap_or(Usage::Roundtrip)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, Usage)> + '_ {
        self.roles.iter().map(|(id, roles)| (*id, roles.usage()))
    }

    /// Qualified name -> usage, for reporting.
    pub fn to_named(&self, graph: &TypeGraph) -> IndexMap<String, Usage> {
        self.iter()
            .map(|(id, usage)| (graph.qualified_name(id), usage))
            .collect()
    }
}

/// Classify every named type reachable from the program's operations.
pub fn classify(graph: &TypeGraph) -> UsageMap {
    let mut classifier = Classifier {
        graph,
        usage: UsageMap::default(),
    };

    let mut found_ops = false;
    for service in graph.http_services() {
        for op in &service.operations {
            found_ops = true;
            classifier.process_op(graph.operation(*op));
        }
    }

    if !found_ops {
        debug!("No service operations found, scanning namespaces.");
        classifier.scan_namespace(graph.global_namespace(), &mut HashSet::new());
    }

    debug!(types = classifier.usage.len(), "Classified type usage.");
    classifier.usage
}

struct Classifier<'a> {
    graph: &'a TypeGraph,
    usage: UsageMap,
}

impl Classifier<'_> {
    fn scan_namespace(&mut self, ns: NamespaceId, visited: &mut HashSet<NamespaceId>) {
        if !visited.insert(ns) || self.graph.is_reserved_namespace(ns) {
            return;
        }
        for op in self.graph.operations_in(ns) {
            self.process_op(self.graph.operation(*op));
        }
        for child in &self.graph.namespace(ns).namespaces {
            self.scan_namespace(*child, visited);
        }
    }

    fn process_op(&mut self, op: &Operation) {
        if let Some(body) = &op.body {
            self.mark(body.ty, Role::Input, &mut HashSet::new());
        }
        for param in &op.parameters {
            self.mark(param.ty, Role::Input, &mut HashSet::new());
        }
        for response in &op.responses {
            for body in &response.bodies {
                self.mark(body.ty, Role::Output, &mut HashSet::new());
            }
        }
    }

    fn tag(&mut self, id: TypeId, role: Role) {
        self.usage.roles.entry(id).or_default().insert(role);
    }

    fn mark(&mut self, id: TypeId, role: Role, visited: &mut HashSet<TypeId>) {
        if !visited.insert(id) {
            return;
        }
        let graph = self.graph;
        match graph.get(id) {
            Type::Model(model) => {
                // Array/Record templates and anonymous models are walked, never tagged.
                if !graph.is_structural_model(id) {
                    self.tag(id, role);
                }
                for prop in model.properties.values() {
                    self.mark(prop.ty, role, visited);
                }
                if let Some(base) = model.base {
                    self.mark(base, role, visited);
                }
                if let Some(indexer) = &model.indexer {
                    self.mark(indexer.value, role, visited);
                }
            }
            Type::Enum(_) => {
                if !graph.is_library_type(id) {
                    self.tag(id, role);
                }
            }
            Type::Union(union) => {
                if union.name.is_some() {
                    if graph.is_library_type(id) {
                        return;
                    }
                    self.tag(id, role);
                }
                for variant in &union.variants {
                    self.mark(variant.ty, role, visited);
                }
            }
            Type::Scalar(_)
            | Type::Intrinsic(_)
            | Type::StringLiteral(_)
            | Type::NumberLiteral(_)
            | Type::BooleanLiteral(_) => {}
        }
    }
}
