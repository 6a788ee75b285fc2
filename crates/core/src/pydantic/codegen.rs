//! Code generation from graph declarations to Python IR.

use indexmap::IndexSet;

use super::constraints::extract_constraints;
use super::mapper::{DeclNames, TypeMapper};
use super::types::{
    EnumBase, FieldArg, FieldValue, PyAlias, PyClass, PyEnum, PyEnumMember, PyField, PyLiteral,
    PyType,
};
use super::utils::sanitize_identifier;
use crate::graph::{DefaultValue, Enum, EnumValue, Model, Property, Type, TypeGraph, Union};

/// Pick the enum base by scanning every member.
pub fn enum_base(e: &Enum) -> EnumBase {
    let all_int = e
        .members
        .iter()
        .all(|m| matches!(m.value, Some(EnumValue::Number(_))));
    let all_string = e
        .members
        .iter()
        .all(|m| matches!(m.value, None | Some(EnumValue::String(_))));
    if all_int {
        EnumBase::IntEnum
    } else if all_string {
        EnumBase::StrEnum
    } else {
        EnumBase::Enum
    }
}

fn enum_literal(value: EnumValue) -> PyLiteral {
    match value {
        EnumValue::String(s) => PyLiteral::Str(s),
        EnumValue::Number(n) => PyLiteral::Number(n),
    }
}

pub fn codegen_enum(name: String, e: &Enum) -> PyEnum {
    PyEnum {
        name,
        base: enum_base(e),
        doc: e.doc.clone(),
        members: e
            .members
            .iter()
            .map(|m| PyEnumMember {
                name: sanitize_identifier(&m.name),
                value: enum_literal(m.effective_value()),
            })
            .collect(),
    }
}

pub fn codegen_union(mapper: &TypeMapper<'_>, name: String, union: &Union) -> PyAlias {
    let mut refs = IndexSet::new();
    let variants: Vec<PyType> = union
        .variants
        .iter()
        .map(|v| mapper.map(v.ty, &mut refs))
        .collect();
    let value = if variants.is_empty() {
        PyType::ANY
    } else {
        PyType::Union(variants)
    };
    PyAlias {
        name,
        value,
        doc: union.doc.clone(),
    }
}

pub fn codegen_model(
    graph: &TypeGraph,
    names: &DeclNames,
    mapper: &TypeMapper<'_>,
    name: String,
    model: &Model,
) -> PyClass {
    let base = match model.base {
        Some(base) if !graph.is_structural_model(base) => names.name_of(graph, base),
        _ => "BaseModel".to_string(),
    };
    PyClass {
        name,
        base,
        doc: model.doc.clone(),
        fields: model
            .properties
            .values()
            .map(|p| codegen_field(graph, mapper, p))
            .collect(),
    }
}

fn default_literal(graph: &TypeGraph, value: &DefaultValue) -> PyLiteral {
    match value {
        DefaultValue::String(s) => PyLiteral::Str(s.clone()),
        DefaultValue::Number(n) => PyLiteral::Number(n.clone()),
        DefaultValue::Boolean(b) => PyLiteral::Bool(*b),
        DefaultValue::Null => PyLiteral::None,
        DefaultValue::EnumMember { ty, member } => match graph.get(*ty) {
            Type::Enum(e) => e
                .members
                .get(*member)
                .map(|m| enum_literal(m.effective_value()))
                .unwrap_or(PyLiteral::None),
            _ => PyLiteral::None,
        },
    }
}

fn codegen_field(graph: &TypeGraph, mapper: &TypeMapper<'_>, prop: &Property) -> PyField {
    let mut refs = IndexSet::new();
    let mut annotation = mapper.map(prop.ty, &mut refs);
    if prop.optional {
        annotation = PyType::Optional(Box::new(annotation));
    }

    let name = sanitize_identifier(&prop.name);
    let mut constraints = extract_constraints(graph, prop);
    if name != prop.name {
        constraints.insert("alias", PyLiteral::Str(prop.name.clone()));
    }
    let default = prop.default.as_ref().map(|d| default_literal(graph, d));

    let value = if !constraints.is_empty() {
        let mut args = Vec::with_capacity(constraints.len() + 1);
        match default {
            Some(value) => args.push(FieldArg {
                keyword: "default",
                value,
            }),
            None if prop.optional => args.push(FieldArg {
                keyword: "default",
                value: PyLiteral::None,
            }),
            None => {}
        }
        args.extend(constraints.into_args());
        FieldValue::Field(args)
    } else if let Some(value) = default {
        FieldValue::Default(value)
    } else if prop.optional {
        FieldValue::Default(PyLiteral::None)
    } else {
        FieldValue::Required
    };

    PyField {
        name,
        annotation,
        value,
    }
}
