//! Node types of the resolved type graph.
//!
//! Every node lives in the [`super::TypeGraph`] arena and is addressed by a
//! [`TypeId`]. Identity is by id, never by name: two models called `Address`
//! in different namespaces are distinct nodes.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Number;

/// Arena index of a type node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena index of a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub(crate) usize);

/// A node of the type graph.
#[derive(Debug, Clone)]
pub enum Type {
    Model(Model),
    Scalar(Scalar),
    Enum(Enum),
    Union(Union),
    Intrinsic(Intrinsic),
    /// String literal type: `"active"`
    StringLiteral(String),
    /// Numeric literal type: `42`, `1.5`
    NumberLiteral(Number),
    /// Boolean literal type: `true`
    BooleanLiteral(bool),
}

impl Type {
    /// Kind label used in diagnostics and debug output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Model(_) => "model",
            Type::Scalar(_) => "scalar",
            Type::Enum(_) => "enum",
            Type::Union(_) => "union",
            Type::Intrinsic(_) => "intrinsic",
            Type::StringLiteral(_) => "string literal",
            Type::NumberLiteral(_) => "number literal",
            Type::BooleanLiteral(_) => "boolean literal",
        }
    }

    /// Declared name, if the node carries one.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Type::Model(m) => m.name.as_str(),
            Type::Scalar(s) => s.name.as_str(),
            Type::Enum(e) => e.name.as_str(),
            Type::Union(u) => u.name.as_deref()?,
            Type::Intrinsic(i) => i.as_str(),
            Type::StringLiteral(_) | Type::NumberLiteral(_) | Type::BooleanLiteral(_) => {
                return None;
            }
        };
        if name.is_empty() { None } else { Some(name) }
    }

    /// Namespace the node was declared in.
    pub fn namespace(&self) -> Option<NamespaceId> {
        match self {
            Type::Model(m) => m.namespace,
            Type::Scalar(s) => s.namespace,
            Type::Enum(e) => e.namespace,
            Type::Union(u) => u.namespace,
            _ => None,
        }
    }

    /// Documentation attached to the node.
    pub fn doc(&self) -> Option<&str> {
        match self {
            Type::Model(m) => m.doc.as_deref(),
            Type::Scalar(s) => s.doc.as_deref(),
            Type::Enum(e) => e.doc.as_deref(),
            Type::Union(u) => u.doc.as_deref(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Intrinsic(Intrinsic::Null))
    }
}

/// A record type: named model, anonymous model, or a structural `Array`/`Record`
/// instantiation.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub namespace: Option<NamespaceId>,
    pub properties: IndexMap<String, Property>,
    pub base: Option<TypeId>,
    pub indexer: Option<Indexer>,
    pub doc: Option<String>,
    pub constraints: Constraints,
}

impl Model {
    /// `Array<T>`: integer-keyed indexer on the built-in `Array` model.
    pub fn array_element(&self) -> Option<TypeId> {
        match &self.indexer {
            Some(indexer) if self.name == "Array" && indexer.key == IndexKey::Integer => {
                Some(indexer.value)
            }
            _ => None,
        }
    }

    /// `Record<T>`: string-keyed indexer on the built-in `Record` model.
    pub fn map_value(&self) -> Option<TypeId> {
        match &self.indexer {
            Some(indexer) if self.name == "Record" && indexer.key == IndexKey::String => {
                Some(indexer.value)
            }
            _ => None,
        }
    }
}

/// Key kind of an index signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKey {
    Integer,
    String,
}

#[derive(Debug, Clone, Copy)]
pub struct Indexer {
    pub key: IndexKey,
    pub value: TypeId,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub default: Option<DefaultValue>,
    pub doc: Option<String>,
    pub constraints: Constraints,
}

/// Literal default value of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
    /// Reference to an enum member by position.
    EnumMember { ty: TypeId, member: usize },
}

/// Validation metadata attached to a property, scalar or model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
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

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scalar {
    pub name: String,
    pub namespace: Option<NamespaceId>,
    pub base: Option<TypeId>,
    pub doc: Option<String>,
    pub constraints: Constraints,
}

#[derive(Debug, Clone, Default)]
pub struct Enum {
    pub name: String,
    pub namespace: Option<NamespaceId>,
    pub members: Vec<EnumMember>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<EnumValue>,
}

impl EnumMember {
    /// The member's value, falling back to its name when it has none.
    pub fn effective_value(&self) -> EnumValue {
        self.value
            .clone()
            .unwrap_or_else(|| EnumValue::String(self.name.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    String(String),
    Number(Number),
}

#[derive(Debug, Clone, Default)]
pub struct Union {
    /// `None` for inline unions such as `string | null`.
    pub name: Option<String>,
    pub namespace: Option<NamespaceId>,
    pub variants: Vec<UnionVariant>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UnionVariant {
    pub name: Option<String>,
    pub ty: TypeId,
}

/// Built-in intrinsic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    Null,
    Void,
    Never,
    Unknown,
    ErrorType,
}

impl Intrinsic {
    pub fn as_str(self) -> &'static str {
        match self {
            Intrinsic::Null => "null",
            Intrinsic::Void => "void",
            Intrinsic::Never => "never",
            Intrinsic::Unknown => "unknown",
            Intrinsic::ErrorType => "ErrorType",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "null" => Some(Intrinsic::Null),
            "void" => Some(Intrinsic::Void),
            "never" => Some(Intrinsic::Never),
            "unknown" => Some(Intrinsic::Unknown),
            "ErrorType" => Some(Intrinsic::ErrorType),
            _ => None,
        }
    }
}
