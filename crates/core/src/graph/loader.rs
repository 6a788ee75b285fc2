//! Program document -> [`TypeGraph`] resolution.
//!
//! Loading runs in two passes so that cyclic references resolve:
//! 1. Declare: walk the namespace tree, allocate an id for every declaration
//! 2. Resolve: fill each declaration in, turning names into ids
//!
//! Enums are filled before everything else so property defaults can refer to
//! their members.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::document::{
    BodyDoc, ConstraintsDoc, EnumDoc, EnumValueDoc, InlineModelDoc, ModelDoc, NamespaceDoc,
    OperationDoc, ProgramDoc, ScalarDoc, StatusCodeDoc, TypeExpr, TypeNode, UnionDoc, VariantDoc,
};
use super::http::{
    Container, HttpBody, HttpParameter, HttpResponse, Operation, OperationId, Server, StatusCode,
};
use super::types::{
    Constraints, DefaultValue, Enum, EnumMember, EnumValue, IndexKey, Indexer, Intrinsic, Model,
    NamespaceId, Property, Scalar, Type, TypeId, Union, UnionVariant,
};
use super::{Diagnostic, Namespace, RESERVED_NAMESPACE, TypeGraph};
use crate::error::GraphError;

/// Built-in scalars and their bases, parents before children.
const BUILTIN_SCALARS: &[(&str, Option<&str>)] = &[
    ("string", None),
    ("boolean", None),
    ("bytes", None),
    ("numeric", None),
    ("integer", Some("numeric")),
    ("float", Some("numeric")),
    ("decimal", Some("numeric")),
    ("decimal128", Some("decimal")),
    ("int64", Some("integer")),
    ("int32", Some("int64")),
    ("int16", Some("int32")),
    ("int8", Some("int16")),
    ("safeint", Some("int64")),
    ("uint64", Some("integer")),
    ("uint32", Some("uint64")),
    ("uint16", Some("uint32")),
    ("uint8", Some("uint16")),
    ("float64", Some("float")),
    ("float32", Some("float64")),
    ("plainDate", None),
    ("plainTime", None),
    ("utcDateTime", None),
    ("offsetDateTime", None),
    ("duration", None),
    ("url", None),
];

const JSON_CONTENT_TYPE: &str = "application/json";

pub(super) fn load(doc: &ProgramDoc) -> Result<TypeGraph, GraphError> {
    let mut loader = Loader::new();
    loader.declare_builtins();

    let global = loader.graph.global;
    let mut pending = Pending::default();
    loader.declare_namespace(&doc.global, global, &mut pending)?;

    for (doc, id, ns) in &pending.enums {
        loader.fill_enum(doc, *id, *ns);
    }
    for (doc, id, ns) in &pending.scalars {
        loader.fill_scalar(doc, *id, *ns)?;
    }
    for (doc, id, ns) in &pending.unions {
        loader.fill_union(doc, *id, *ns)?;
    }
    for (doc, id, ns) in &pending.models {
        loader.fill_model(doc, *id, *ns)?;
    }
    for (doc, ns) in &pending.namespaces {
        loader.fill_operations(doc, *ns)?;
    }

    loader.graph.diagnostics = doc
        .diagnostics
        .iter()
        .map(|d| Diagnostic {
            severity: d.severity,
            code: d.code.clone(),
            message: d.message.clone(),
        })
        .collect();

    debug!(
        types = loader.graph.types.len(),
        namespaces = loader.graph.namespaces.len(),
        operations = loader.graph.operations.len(),
        "Loaded type graph."
    );
    Ok(loader.graph)
}

/// Declarations awaiting the resolve pass.
#[derive(Default)]
struct Pending<'a> {
    namespaces: Vec<(&'a NamespaceDoc, NamespaceId)>,
    models: Vec<(&'a ModelDoc, TypeId, NamespaceId)>,
    enums: Vec<(&'a EnumDoc, TypeId, NamespaceId)>,
    unions: Vec<(&'a UnionDoc, TypeId, NamespaceId)>,
    scalars: Vec<(&'a ScalarDoc, TypeId, NamespaceId)>,
}

struct Loader {
    graph: TypeGraph,
    reserved: NamespaceId,
    null: TypeId,
    void: TypeId,
    never: TypeId,
    unknown: TypeId,
}

impl Loader {
    fn new() -> Self {
        let mut graph = TypeGraph {
            types: Vec::new(),
            namespaces: vec![Namespace::default()],
            operations: Vec::new(),
            global: NamespaceId(0),
            diagnostics: Vec::new(),
        };
        let mut intrinsic = |i| {
            graph.types.push(Type::Intrinsic(i));
            TypeId(graph.types.len() - 1)
        };
        let null = intrinsic(Intrinsic::Null);
        let void = intrinsic(Intrinsic::Void);
        let never = intrinsic(Intrinsic::Never);
        let unknown = intrinsic(Intrinsic::Unknown);
        Self {
            graph,
            reserved: NamespaceId(0),
            null,
            void,
            never,
            unknown,
        }
    }

    fn alloc(&mut self, ty: Type) -> TypeId {
        self.graph.types.push(ty);
        TypeId(self.graph.types.len() - 1)
    }

    fn add_namespace(&mut self, name: &str, parent: NamespaceId) -> NamespaceId {
        let id = NamespaceId(self.graph.namespaces.len());
        self.graph.namespaces.push(Namespace {
            name: name.to_string(),
            parent: Some(parent),
            ..Namespace::default()
        });
        self.graph.namespaces[parent.0].namespaces.push(id);
        id
    }

    fn declare_builtins(&mut self) {
        let reserved = self.add_namespace(RESERVED_NAMESPACE, self.graph.global);
        self.reserved = reserved;
        for (name, base) in BUILTIN_SCALARS {
            let base = base.and_then(|b| self.graph.namespaces[reserved.0].declared.get(b).copied());
            let id = self.alloc(Type::Scalar(Scalar {
                name: (*name).to_string(),
                namespace: Some(reserved),
                base,
                ..Scalar::default()
            }));
            let ns = &mut self.graph.namespaces[reserved.0];
            ns.scalars.push(id);
            ns.declared.insert((*name).to_string(), id);
        }
    }

    fn declare(&mut self, ns: NamespaceId, name: &str, ty: Type) -> Result<TypeId, GraphError> {
        if self.graph.namespaces[ns.0].declared.contains_key(name) {
            let ns_name = self.graph.namespace_name(ns);
            let qualified = if ns_name.is_empty() {
                name.to_string()
            } else {
                format!("{ns_name}.{name}")
            };
            return Err(GraphError::DuplicateDeclaration(qualified));
        }
        let id = self.alloc(ty);
        self.graph.namespaces[ns.0]
            .declared
            .insert(name.to_string(), id);
        Ok(id)
    }

    fn declare_namespace<'a>(
        &mut self,
        doc: &'a NamespaceDoc,
        id: NamespaceId,
        pending: &mut Pending<'a>,
    ) -> Result<(), GraphError> {
        {
            let ns = &mut self.graph.namespaces[id.0];
            ns.doc = doc.doc.clone();
            ns.service = doc.service.as_ref().map(|s| s.title.clone());
            ns.servers = doc
                .servers
                .iter()
                .map(|s| Server {
                    url: s.url.clone(),
                    description: s.description.clone(),
                })
                .collect();
        }
        pending.namespaces.push((doc, id));

        // Placeholders; the resolve pass overwrites each slot.
        for model in &doc.models {
            let ty = self.declare(id, &model.name, Type::Intrinsic(Intrinsic::Unknown))?;
            self.graph.namespaces[id.0].models.push(ty);
            pending.models.push((model, ty, id));
        }
        for e in &doc.enums {
            let ty = self.declare(id, &e.name, Type::Intrinsic(Intrinsic::Unknown))?;
            self.graph.namespaces[id.0].enums.push(ty);
            pending.enums.push((e, ty, id));
        }
        for u in &doc.unions {
            let ty = self.declare(id, &u.name, Type::Intrinsic(Intrinsic::Unknown))?;
            self.graph.namespaces[id.0].unions.push(ty);
            pending.unions.push((u, ty, id));
        }
        for s in &doc.scalars {
            let ty = self.declare(id, &s.name, Type::Intrinsic(Intrinsic::Unknown))?;
            self.graph.namespaces[id.0].scalars.push(ty);
            pending.scalars.push((s, ty, id));
        }

        for child in &doc.namespaces {
            let child_id = self.add_namespace(&child.name, id);
            self.declare_namespace(child, child_id, pending)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Name resolution
    // -------------------------------------------------------------------------

    /// Resolve a (possibly dotted) path relative to one namespace.
    fn lookup_in(&self, ns: NamespaceId, path: &[&str]) -> Option<TypeId> {
        let (last, prefix) = path.split_last()?;
        let mut current = ns;
        for segment in prefix {
            current = *self.graph.namespaces[current.0]
                .namespaces
                .iter()
                .find(|child| self.graph.namespaces[child.0].name == *segment)?;
        }
        self.graph.namespaces[current.0].declared.get(*last).copied()
    }

    /// Enclosing namespace chain first, then intrinsics, then built-ins.
    fn lookup(&self, name: &str, scope: NamespaceId) -> Option<TypeId> {
        let path: Vec<&str> = name.split('.').collect();
        let mut current = Some(scope);
        while let Some(ns) = current {
            if let Some(id) = self.lookup_in(ns, &path) {
                return Some(id);
            }
            current = self.graph.namespaces[ns.0].parent;
        }
        match Intrinsic::parse(name) {
            Some(Intrinsic::Null) => return Some(self.null),
            Some(Intrinsic::Void) => return Some(self.void),
            Some(Intrinsic::Never) => return Some(self.never),
            Some(Intrinsic::Unknown) => return Some(self.unknown),
            Some(Intrinsic::ErrorType) | None => {}
        }
        self.lookup_in(self.reserved, &path)
    }

    fn resolve_name(
        &self,
        name: &str,
        scope: NamespaceId,
        context: &str,
    ) -> Result<TypeId, GraphError> {
        self.lookup(name, scope)
            .ok_or_else(|| GraphError::UnresolvedReference {
                reference: name.to_string(),
                context: context.to_string(),
            })
    }

    fn resolve_expr(
        &mut self,
        expr: &TypeExpr,
        scope: NamespaceId,
        context: &str,
    ) -> Result<TypeId, GraphError> {
        let node = match expr {
            TypeExpr::Name(name) => return self.resolve_name(name, scope, context),
            TypeExpr::Node(node) => node,
        };
        match node {
            TypeNode::Ref(name) => self.resolve_name(name, scope, context),
            TypeNode::Array(element) => {
                let value = self.resolve_expr(element, scope, context)?;
                Ok(self.structural("Array", IndexKey::Integer, value))
            }
            TypeNode::Record(element) => {
                let value = self.resolve_expr(element, scope, context)?;
                Ok(self.structural("Record", IndexKey::String, value))
            }
            TypeNode::Union(options) => {
                let variants = options
                    .iter()
                    .map(|o| {
                        Ok(UnionVariant {
                            name: None,
                            ty: self.resolve_expr(o, scope, context)?,
                        })
                    })
                    .collect::<Result<Vec<_>, GraphError>>()?;
                Ok(self.alloc(Type::Union(Union {
                    variants,
                    ..Union::default()
                })))
            }
            TypeNode::Model(inline) => self.inline_model(inline, scope, context),
            TypeNode::Intrinsic(name) => match Intrinsic::parse(name) {
                Some(Intrinsic::Null) => Ok(self.null),
                Some(Intrinsic::Void) => Ok(self.void),
                Some(Intrinsic::Never) => Ok(self.never),
                Some(Intrinsic::Unknown) => Ok(self.unknown),
                Some(Intrinsic::ErrorType) => Ok(self.alloc(Type::Intrinsic(Intrinsic::ErrorType))),
                None => Err(GraphError::UnresolvedReference {
                    reference: name.clone(),
                    context: context.to_string(),
                }),
            },
            TypeNode::String(s) => Ok(self.alloc(Type::StringLiteral(s.clone()))),
            TypeNode::Number(n) => Ok(self.alloc(Type::NumberLiteral(n.clone()))),
            TypeNode::Boolean(b) => Ok(self.alloc(Type::BooleanLiteral(*b))),
        }
    }

    /// Each `Array<T>` / `Record<T>` occurrence becomes its own template instance.
    fn structural(&mut self, name: &str, key: IndexKey, value: TypeId) -> TypeId {
        self.alloc(Type::Model(Model {
            name: name.to_string(),
            namespace: Some(self.reserved),
            indexer: Some(Indexer { key, value }),
            ..Model::default()
        }))
    }

    fn inline_model(
        &mut self,
        inline: &InlineModelDoc,
        scope: NamespaceId,
        context: &str,
    ) -> Result<TypeId, GraphError> {
        let mut properties = IndexMap::new();
        for prop in &inline.properties {
            let ty = self.resolve_expr(&prop.ty, scope, context)?;
            properties.insert(
                prop.name.clone(),
                Property {
                    name: prop.name.clone(),
                    ty,
                    optional: prop.optional,
                    default: None,
                    doc: prop.doc.clone(),
                    constraints: Constraints::default(),
                },
            );
        }
        Ok(self.alloc(Type::Model(Model {
            properties,
            ..Model::default()
        })))
    }

    fn context(&self, ns: NamespaceId, name: &str) -> String {
        let ns_name = self.graph.namespace_name(ns);
        if ns_name.is_empty() {
            name.to_string()
        } else {
            format!("{ns_name}.{name}")
        }
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn fill_enum(&mut self, doc: &EnumDoc, id: TypeId, ns: NamespaceId) {
        let members = doc
            .members
            .iter()
            .map(|m| EnumMember {
                name: m.name.clone(),
                value: m.value.as_ref().map(|v| match v {
                    EnumValueDoc::String(s) => EnumValue::String(s.clone()),
                    EnumValueDoc::Number(n) => EnumValue::Number(n.clone()),
                }),
            })
            .collect();
        self.graph.types[id.0] = Type::Enum(Enum {
            name: doc.name.clone(),
            namespace: Some(ns),
            members,
            doc: doc.doc.clone(),
        });
    }

    fn fill_scalar(
        &mut self,
        doc: &ScalarDoc,
        id: TypeId,
        ns: NamespaceId,
    ) -> Result<(), GraphError> {
        let context = self.context(ns, &doc.name);
        let base = match &doc.extends {
            Some(name) => {
                let base = self.resolve_name(name, ns, &context)?;
                if !self.is_scalar_slot(base) {
                    return Err(GraphError::KindMismatch {
                        reference: name.clone(),
                        context,
                        expected: "scalar",
                    });
                }
                Some(base)
            }
            None => None,
        };
        self.graph.types[id.0] = Type::Scalar(Scalar {
            name: doc.name.clone(),
            namespace: Some(ns),
            base,
            doc: doc.doc.clone(),
            constraints: constraints(&doc.constraints),
        });
        Ok(())
    }

    /// A user scalar may extend another user scalar that is not filled in yet.
    fn is_scalar_slot(&self, id: TypeId) -> bool {
        matches!(self.graph.types[id.0], Type::Scalar(_))
            || self.graph.namespaces.iter().any(|n| n.scalars.contains(&id))
    }

    fn fill_union(
        &mut self,
        doc: &UnionDoc,
        id: TypeId,
        ns: NamespaceId,
    ) -> Result<(), GraphError> {
        let context = self.context(ns, &doc.name);
        let mut variants = Vec::with_capacity(doc.variants.len());
        for variant in &doc.variants {
            let (name, expr) = match variant {
                VariantDoc::Named { name, ty } => (Some(name.clone()), ty),
                VariantDoc::Bare(ty) => (None, ty),
            };
            let ty = self.resolve_expr(expr, ns, &context)?;
            variants.push(UnionVariant { name, ty });
        }
        self.graph.types[id.0] = Type::Union(Union {
            name: Some(doc.name.clone()),
            namespace: Some(ns),
            variants,
            doc: doc.doc.clone(),
        });
        Ok(())
    }

    fn fill_model(
        &mut self,
        doc: &ModelDoc,
        id: TypeId,
        ns: NamespaceId,
    ) -> Result<(), GraphError> {
        let context = self.context(ns, &doc.name);
        let base = match &doc.extends {
            Some(name) => {
                let base = self.resolve_name(name, ns, &context)?;
                if !self.is_model_slot(base) {
                    return Err(GraphError::KindMismatch {
                        reference: name.clone(),
                        context,
                        expected: "model",
                    });
                }
                Some(base)
            }
            None => None,
        };
        let indexer = match &doc.indexer {
            Some(expr) => Some(Indexer {
                key: IndexKey::String,
                value: self.resolve_expr(expr, ns, &context)?,
            }),
            None => None,
        };

        let mut properties = IndexMap::new();
        for prop in &doc.properties {
            let prop_context = format!("{context}.{}", prop.name);
            let ty = self.resolve_expr(&prop.ty, ns, &prop_context)?;
            let default = prop
                .default
                .as_ref()
                .and_then(|value| self.default_value(value, ty, &prop_context));
            properties.insert(
                prop.name.clone(),
                Property {
                    name: prop.name.clone(),
                    ty,
                    optional: prop.optional,
                    default,
                    doc: prop.doc.clone(),
                    constraints: constraints(&prop.constraints),
                },
            );
        }

        self.graph.types[id.0] = Type::Model(Model {
            name: doc.name.clone(),
            namespace: Some(ns),
            properties,
            base,
            indexer,
            doc: doc.doc.clone(),
            constraints: constraints(&doc.constraints),
        });
        Ok(())
    }

    /// Models are filled last, so a declared model may still hold its placeholder.
    fn is_model_slot(&self, id: TypeId) -> bool {
        matches!(self.graph.types[id.0], Type::Model(_))
            || self.graph.namespaces.iter().any(|n| n.models.contains(&id))
    }

    fn default_value(&self, value: &Value, ty: TypeId, context: &str) -> Option<DefaultValue> {
        if let (Type::Enum(e), Value::String(s)) = (&self.graph.types[ty.0], value)
            && let Some(member) = e.members.iter().position(|m| m.name == *s)
        {
            return Some(DefaultValue::EnumMember { ty, member });
        }
        match value {
            Value::String(s) => Some(DefaultValue::String(s.clone())),
            Value::Number(n) => Some(DefaultValue::Number(n.clone())),
            Value::Bool(b) => Some(DefaultValue::Boolean(*b)),
            Value::Null => Some(DefaultValue::Null),
            Value::Array(_) | Value::Object(_) => {
                debug!(context, "Ignoring non-scalar default value.");
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    fn fill_operations(&mut self, doc: &NamespaceDoc, ns: NamespaceId) -> Result<(), GraphError> {
        for op in &doc.operations {
            let id = self.operation(op, Container::Namespace(ns), ns)?;
            self.graph.namespaces[ns.0].operations.push(id);
        }
        for iface in &doc.interfaces {
            for op in &iface.operations {
                let container = Container::Interface {
                    namespace: ns,
                    name: iface.name.clone(),
                };
                let id = self.operation(op, container, ns)?;
                self.graph.namespaces[ns.0].operations.push(id);
            }
        }
        Ok(())
    }

    fn operation(
        &mut self,
        doc: &OperationDoc,
        container: Container,
        ns: NamespaceId,
    ) -> Result<OperationId, GraphError> {
        let context = match &container {
            Container::Interface { name, .. } => self.context(ns, &format!("{name}.{}", doc.name)),
            Container::Namespace(_) => self.context(ns, &doc.name),
        };

        let mut parameters = Vec::with_capacity(doc.parameters.len());
        for param in &doc.parameters {
            parameters.push(HttpParameter {
                name: param.name.clone(),
                location: param.location,
                ty: self.resolve_expr(&param.ty, ns, &context)?,
                optional: param.optional,
                doc: param.doc.clone(),
            });
        }
        let body = match &doc.body {
            Some(body) => Some(self.body(body, ns, &context)?),
            None => None,
        };
        let mut responses = Vec::with_capacity(doc.responses.len());
        for response in &doc.responses {
            let mut bodies = Vec::with_capacity(response.bodies.len());
            for body in &response.bodies {
                bodies.push(self.body(body, ns, &context)?);
            }
            let status = match &response.status_code {
                StatusCodeDoc::Code(code) => StatusCode::Code(*code),
                StatusCodeDoc::Range { start, end } => StatusCode::Range {
                    start: *start,
                    end: *end,
                },
                StatusCodeDoc::Wildcard(_) => StatusCode::Wildcard,
            };
            responses.push(HttpResponse {
                status,
                description: response.description.clone(),
                bodies,
            });
        }

        self.graph.operations.push(Operation {
            name: doc.name.clone(),
            container,
            verb: doc.verb,
            path: doc.path.clone(),
            doc: doc.doc.clone(),
            summary: doc.summary.clone(),
            parameters,
            body,
            responses,
        });
        Ok(OperationId(self.graph.operations.len() - 1))
    }

    fn body(
        &mut self,
        doc: &BodyDoc,
        ns: NamespaceId,
        context: &str,
    ) -> Result<HttpBody, GraphError> {
        let content_types = if doc.content_types.is_empty() {
            vec![JSON_CONTENT_TYPE.to_string()]
        } else {
            doc.content_types.clone()
        };
        Ok(HttpBody {
            ty: self.resolve_expr(&doc.ty, ns, context)?,
            content_types,
        })
    }
}

fn constraints(doc: &ConstraintsDoc) -> Constraints {
    Constraints {
        min_length: doc.min_length,
        max_length: doc.max_length,
        min_items: doc.min_items,
        max_items: doc.max_items,
        pattern: doc.pattern.clone(),
        min_value: doc.min_value.clone(),
        max_value: doc.max_value.clone(),
        min_value_exclusive: doc.min_value_exclusive.clone(),
        max_value_exclusive: doc.max_value_exclusive.clone(),
    }
}
