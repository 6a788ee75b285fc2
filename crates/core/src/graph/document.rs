//! Program document structs for serde deserialization.
//!
//! This is the wire shape in which the host compiler hands over an
//! already-resolved program. References between declarations are by name and
//! are resolved by [`super::loader`].

use serde::Deserialize;
use serde_json::Number;

use super::http::{HttpVerb, ParamLocation};

/// Root of a program document. The root itself is the global namespace.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDoc {
    #[serde(flatten)]
    pub global: NamespaceDoc,
    #[serde(default)]
    pub diagnostics: Vec<DiagnosticDoc>,
}

/// A namespace and everything declared directly inside it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDoc {
    #[serde(default)]
    pub name: String,
    pub doc: Option<String>,
    /// Present when the namespace is an HTTP service.
    pub service: Option<ServiceDoc>,
    #[serde(default)]
    pub servers: Vec<ServerDoc>,
    #[serde(default)]
    pub namespaces: Vec<NamespaceDoc>,
    #[serde(default)]
    pub models: Vec<ModelDoc>,
    #[serde(default)]
    pub enums: Vec<EnumDoc>,
    #[serde(default)]
    pub unions: Vec<UnionDoc>,
    #[serde(default)]
    pub scalars: Vec<ScalarDoc>,
    #[serde(default)]
    pub operations: Vec<OperationDoc>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDoc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceDoc {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerDoc {
    pub url: String,
    pub description: Option<String>,
}

/// Decorator-provided validation metadata.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintsDoc {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub pattern: Option<String>,
    pub min_value: Option<Number>,
    pub max_value: Option<Number>,
    pub min_value_exclusive: Option<Number>,
    pub max_value_exclusive: Option<Number>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDoc {
    #[serde(default)]
    pub name: String,
    pub doc: Option<String>,
    /// Base model reference (`model Child extends Base`).
    pub extends: Option<String>,
    /// Index signature value type (`model Tags is Record<string>`).
    pub indexer: Option<TypeExpr>,
    #[serde(default)]
    pub properties: Vec<PropertyDoc>,
    #[serde(flatten)]
    pub constraints: ConstraintsDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub optional: bool,
    pub default: Option<serde_json::Value>,
    pub doc: Option<String>,
    #[serde(flatten)]
    pub constraints: ConstraintsDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarDoc {
    pub name: String,
    pub doc: Option<String>,
    pub extends: Option<String>,
    #[serde(flatten)]
    pub constraints: ConstraintsDoc,
}

#[derive(Debug, Deserialize)]
pub struct EnumDoc {
    pub name: String,
    pub doc: Option<String>,
    #[serde(default)]
    pub members: Vec<EnumMemberDoc>,
}

#[derive(Debug, Deserialize)]
pub struct EnumMemberDoc {
    pub name: String,
    pub value: Option<EnumValueDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumValueDoc {
    String(String),
    Number(Number),
}

#[derive(Debug, Deserialize)]
pub struct UnionDoc {
    pub name: String,
    pub doc: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantDoc>,
}

/// A union variant, either bare (`"string"`) or named (`{"name": "a", "type": "string"}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VariantDoc {
    Named {
        name: String,
        #[serde(rename = "type")]
        ty: TypeExpr,
    },
    Bare(TypeExpr),
}

/// A type expression: a bare reference name or a structural node.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeExpr {
    Name(String),
    Node(TypeNode),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeNode {
    /// Reference to a declaration: `{"ref": "Billing.Address"}`
    Ref(String),
    /// `Array<T>`
    Array(Box<TypeExpr>),
    /// `Record<T>`
    Record(Box<TypeExpr>),
    /// Inline union: `string | null`
    Union(Vec<TypeExpr>),
    /// Inline anonymous model
    Model(InlineModelDoc),
    /// `null`, `void`, `never`, `unknown`
    Intrinsic(String),
    String(String),
    Number(Number),
    Boolean(bool),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InlineModelDoc {
    #[serde(default)]
    pub properties: Vec<InlinePropertyDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InlinePropertyDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub optional: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InterfaceDoc {
    pub name: String,
    #[serde(default)]
    pub operations: Vec<OperationDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDoc {
    pub name: String,
    pub verb: HttpVerb,
    #[serde(default = "default_path")]
    pub path: String,
    pub doc: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDoc>,
    pub body: Option<BodyDoc>,
    #[serde(default)]
    pub responses: Vec<ResponseDoc>,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDoc {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub optional: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyDoc {
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub content_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDoc {
    pub status_code: StatusCodeDoc,
    pub description: Option<String>,
    #[serde(default)]
    pub bodies: Vec<BodyDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusCodeDoc {
    Code(u16),
    Range { start: u16, end: u16 },
    /// Only `"*"` is meaningful; anything else is treated as a wildcard too.
    Wildcard(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticDoc {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl ProgramDoc {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
