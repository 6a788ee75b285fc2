//! Python IR for pydantic code generation.
//!
//! - PyType: type annotations (primitives, List, Dict, Union, forward refs)
//! - PyDecl: top-level declarations (enum classes, aliases, model classes)
//! - PyModule: imports plus ordered declarations

use serde_json::Number;

/// Python type annotation
#[derive(Debug, Clone, PartialEq)]
pub enum PyType {
    Primitive(PyPrimitive),
    /// `List[T]`
    List(Box<PyType>),
    /// `Dict[str, T]`
    Dict(Box<PyType>),
    /// `Union[A, B]`
    Union(Vec<PyType>),
    /// `Optional[T]`
    Optional(Box<PyType>),
    /// Quoted reference to a declaration: `"User"`
    ForwardRef(String),
    /// `None` inside a union
    None,
}

impl PyType {
    pub const ANY: PyType = PyType::Primitive(PyPrimitive::Any);

    /// Visit this annotation and every nested annotation.
    pub fn walk(&self, f: &mut impl FnMut(&PyType)) {
        f(self);
        match self {
            PyType::List(inner) | PyType::Dict(inner) | PyType::Optional(inner) => inner.walk(f),
            PyType::Union(items) => {
                for item in items {
                    item.walk(f);
                }
            }
            PyType::Primitive(_) | PyType::ForwardRef(_) | PyType::None => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PyPrimitive {
    Str,
    Bool,
    Int,
    Float,
    Bytes,
    Datetime,
    Timedelta,
    Any,
}

/// Python literal value
#[derive(Debug, Clone, PartialEq)]
pub enum PyLiteral {
    Str(String),
    Number(Number),
    Bool(bool),
    None,
}

/// One `keyword=value` argument of a `Field(...)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArg {
    pub keyword: &'static str,
    pub value: PyLiteral,
}

/// Right-hand side of a field declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Required,
    /// `= value`
    Default(PyLiteral),
    /// `= Field(k=v, ...)`
    Field(Vec<FieldArg>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PyField {
    pub name: String,
    pub annotation: PyType,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PyClass {
    pub name: String,
    pub base: String,
    pub doc: Option<String>,
    pub fields: Vec<PyField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumBase {
    IntEnum,
    StrEnum,
    Enum,
}

impl EnumBase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumBase::IntEnum => "IntEnum",
            EnumBase::StrEnum => "StrEnum",
            EnumBase::Enum => "Enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PyEnumMember {
    pub name: String,
    pub value: PyLiteral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PyEnum {
    pub name: String,
    pub base: EnumBase,
    pub doc: Option<String>,
    pub members: Vec<PyEnumMember>,
}

/// `Name = Union[...]`
#[derive(Debug, Clone, PartialEq)]
pub struct PyAlias {
    pub name: String,
    pub value: PyType,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PyDecl {
    Enum(PyEnum),
    Alias(PyAlias),
    Class(PyClass),
}

/// `from module import a, b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyImport {
    pub module: &'static str,
    pub names: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PyModule {
    pub imports: Vec<PyImport>,
    pub decls: Vec<PyDecl>,
}
