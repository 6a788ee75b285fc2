//! Python code emission via the Emit trait.
//!
//! Each IR node renders itself; a module is the imports followed by its
//! declarations separated by two blank lines.

use super::types::{
    FieldArg, FieldValue, PyAlias, PyClass, PyDecl, PyEnum, PyField, PyImport, PyLiteral,
    PyModule, PyPrimitive, PyType,
};
use super::utils::{escape_docstring, quote_python_string};

/// Trait for emitting Python code from IR nodes.
pub trait Emit {
    fn emit(&self) -> String;
}

// =============================================================================
// Types and literals
// =============================================================================

impl Emit for PyPrimitive {
    fn emit(&self) -> String {
        match self {
            PyPrimitive::Str => "str",
            PyPrimitive::Bool => "bool",
            PyPrimitive::Int => "int",
            PyPrimitive::Float => "float",
            PyPrimitive::Bytes => "bytes",
            PyPrimitive::Datetime => "datetime",
            PyPrimitive::Timedelta => "timedelta",
            PyPrimitive::Any => "Any",
        }
        .to_string()
    }
}

impl Emit for PyType {
    fn emit(&self) -> String {
        match self {
            PyType::Primitive(p) => p.emit(),
            PyType::List(inner) => format!("List[{}]", inner.emit()),
            PyType::Dict(inner) => format!("Dict[str, {}]", inner.emit()),
            PyType::Union(items) => format!(
                "Union[{}]",
                items.iter().map(Emit::emit).collect::<Vec<_>>().join(", ")
            ),
            PyType::Optional(inner) => format!("Optional[{}]", inner.emit()),
            PyType::ForwardRef(name) => format!("\"{name}\""),
            PyType::None => "None".to_string(),
        }
    }
}

impl Emit for PyLiteral {
    fn emit(&self) -> String {
        match self {
            PyLiteral::Str(s) => quote_python_string(s),
            PyLiteral::Number(n) => n.to_string(),
            PyLiteral::Bool(true) => "True".to_string(),
            PyLiteral::Bool(false) => "False".to_string(),
            PyLiteral::None => "None".to_string(),
        }
    }
}

impl Emit for FieldArg {
    fn emit(&self) -> String {
        format!("{}={}", self.keyword, self.value.emit())
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// Docstring lines at the given indent; continuation lines are indented too.
fn docstring(doc: &str, indent: &str) -> String {
    let escaped = escape_docstring(doc);
    let body = escaped
        .lines()
        .collect::<Vec<_>>()
        .join(&format!("\n{indent}"));
    format!("{indent}\"\"\"{body}\"\"\"")
}

impl Emit for PyField {
    fn emit(&self) -> String {
        let head = format!("    {}: {}", self.name, self.annotation.emit());
        match &self.value {
            FieldValue::Required => head,
            FieldValue::Default(value) => format!("{head} = {}", value.emit()),
            FieldValue::Field(args) => format!(
                "{head} = Field({})",
                args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

impl Emit for PyClass {
    fn emit(&self) -> String {
        let mut lines = vec![format!("class {}({}):", self.name, self.base)];
        if let Some(doc) = &self.doc {
            lines.push(docstring(doc, "    "));
        }
        if self.fields.is_empty() && self.doc.is_none() {
            lines.push("    pass".to_string());
        }
        lines.extend(self.fields.iter().map(Emit::emit));
        lines.join("\n")
    }
}

impl Emit for PyEnum {
    fn emit(&self) -> String {
        let mut lines = vec![format!("class {}({}):", self.name, self.base.as_str())];
        if let Some(doc) = &self.doc {
            lines.push(docstring(doc, "    "));
        }
        for member in &self.members {
            lines.push(format!("    {} = {}", member.name, member.value.emit()));
        }
        if self.members.is_empty() && self.doc.is_none() {
            lines.push("    pass".to_string());
        }
        lines.join("\n")
    }
}

impl Emit for PyAlias {
    fn emit(&self) -> String {
        let mut out = format!("{} = {}", self.name, self.value.emit());
        if let Some(doc) = &self.doc {
            out.push('\n');
            out.push_str(&docstring(doc, ""));
        }
        out
    }
}

impl Emit for PyDecl {
    fn emit(&self) -> String {
        match self {
            PyDecl::Enum(e) => e.emit(),
            PyDecl::Alias(a) => a.emit(),
            PyDecl::Class(c) => c.emit(),
        }
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for PyImport {
    fn emit(&self) -> String {
        format!("from {} import {}", self.module, self.names.join(", "))
    }
}

impl Emit for PyModule {
    fn emit(&self) -> String {
        let mut sections = Vec::new();
        if !self.imports.is_empty() {
            sections.push(
                self.imports
                    .iter()
                    .map(Emit::emit)
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        sections.extend(self.decls.iter().map(Emit::emit));
        let mut out = sections.join("\n\n\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pydantic::types::{EnumBase, PyEnumMember};

    #[test]
    fn test_emit_types() {
        let ty = PyType::Optional(Box::new(PyType::Union(vec![
            PyType::List(Box::new(PyType::ForwardRef("Item".into()))),
            PyType::Dict(Box::new(PyType::Primitive(PyPrimitive::Int))),
            PyType::None,
        ])));
        assert_eq!(ty.emit(), "Optional[Union[List[\"Item\"], Dict[str, int], None]]");
    }

    #[test]
    fn test_emit_literals() {
        assert_eq!(PyLiteral::Bool(true).emit(), "True");
        assert_eq!(PyLiteral::None.emit(), "None");
        assert_eq!(PyLiteral::Number(serde_json::Number::from(42)).emit(), "42");
        assert_eq!(PyLiteral::Str("a\"b".into()).emit(), "\"a\\\"b\"");
    }

    #[test]
    fn test_emit_class_with_fields() {
        let class = PyClass {
            name: "User".into(),
            base: "BaseModel".into(),
            doc: Some("A user.".into()),
            fields: vec![
                PyField {
                    name: "name".into(),
                    annotation: PyType::Primitive(PyPrimitive::Str),
                    value: FieldValue::Required,
                },
                PyField {
                    name: "age".into(),
                    annotation: PyType::Optional(Box::new(PyType::Primitive(PyPrimitive::Int))),
                    value: FieldValue::Field(vec![
                        FieldArg {
                            keyword: "default",
                            value: PyLiteral::None,
                        },
                        FieldArg {
                            keyword: "ge",
                            value: PyLiteral::Number(0.into()),
                        },
                    ]),
                },
            ],
        };
        assert_eq!(
            class.emit(),
            "class User(BaseModel):\n    \"\"\"A user.\"\"\"\n    name: str\n    age: Optional[int] = Field(default=None, ge=0)"
        );
    }

    #[test]
    fn test_emit_empty_class_and_enum() {
        let class = PyClass {
            name: "Empty".into(),
            base: "BaseModel".into(),
            doc: None,
            fields: vec![],
        };
        assert_eq!(class.emit(), "class Empty(BaseModel):\n    pass");

        let e = PyEnum {
            name: "Nothing".into(),
            base: EnumBase::IntEnum,
            doc: None,
            members: vec![],
        };
        assert_eq!(e.emit(), "class Nothing(IntEnum):\n    pass");
    }

    #[test]
    fn test_emit_enum_members() {
        let e = PyEnum {
            name: "Mixed".into(),
            base: EnumBase::Enum,
            doc: None,
            members: vec![
                PyEnumMember {
                    name: "one".into(),
                    value: PyLiteral::Number(1.into()),
                },
                PyEnumMember {
                    name: "two".into(),
                    value: PyLiteral::Str("two".into()),
                },
            ],
        };
        assert_eq!(e.emit(), "class Mixed(Enum):\n    one = 1\n    two = \"two\"");
    }

    #[test]
    fn test_emit_alias_with_doc() {
        let alias = PyAlias {
            name: "Pet".into(),
            value: PyType::Union(vec![
                PyType::ForwardRef("Cat".into()),
                PyType::ForwardRef("Dog".into()),
            ]),
            doc: Some("Any pet.\nCats or dogs.".into()),
        };
        assert_eq!(
            alias.emit(),
            "Pet = Union[\"Cat\", \"Dog\"]\n\"\"\"Any pet.\nCats or dogs.\"\"\""
        );
    }

    #[test]
    fn test_emit_module_spacing() {
        let module = PyModule {
            imports: vec![PyImport {
                module: "pydantic",
                names: vec!["BaseModel"],
            }],
            decls: vec![
                PyDecl::Alias(PyAlias {
                    name: "Id".into(),
                    value: PyType::Primitive(PyPrimitive::Any),
                    doc: None,
                }),
                PyDecl::Alias(PyAlias {
                    name: "Key".into(),
                    value: PyType::Primitive(PyPrimitive::Any),
                    doc: None,
                }),
            ],
        };
        assert_eq!(
            module.emit(),
            "from pydantic import BaseModel\n\n\nId = Any\n\n\nKey = Any\n"
        );
    }
}
