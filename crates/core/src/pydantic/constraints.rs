//! Validation metadata -> `Field(...)` keyword arguments.

use indexmap::IndexMap;

use super::types::{FieldArg, PyLiteral};
use crate::graph::{Constraints, Property, Type, TypeGraph};

/// Ordered set of `Field` keyword arguments; the first value for a keyword wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    args: IndexMap<&'static str, PyLiteral>,
}

impl ConstraintSet {
    pub fn insert(&mut self, keyword: &'static str, value: PyLiteral) {
        self.args.entry(keyword).or_insert(value);
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    fn extend_from(&mut self, c: &Constraints) {
        if let Some(v) = c.min_length {
            self.insert("min_length", PyLiteral::Number(v.into()));
        }
        if let Some(v) = c.max_length {
            self.insert("max_length", PyLiteral::Number(v.into()));
        }
        if let Some(p) = &c.pattern {
            self.insert("pattern", PyLiteral::Str(p.clone()));
        }
        if let Some(v) = &c.min_value {
            self.insert("ge", PyLiteral::Number(v.clone()));
        }
        if let Some(v) = &c.max_value {
            self.insert("le", PyLiteral::Number(v.clone()));
        }
        if let Some(v) = &c.min_value_exclusive {
            self.insert("gt", PyLiteral::Number(v.clone()));
        }
        if let Some(v) = &c.max_value_exclusive {
            self.insert("lt", PyLiteral::Number(v.clone()));
        }
        // Item counts share pydantic's length keywords.
        if let Some(v) = c.min_items {
            self.insert("min_length", PyLiteral::Number(v.into()));
        }
        if let Some(v) = c.max_items {
            self.insert("max_length", PyLiteral::Number(v.into()));
        }
    }

    pub fn into_args(self) -> Vec<FieldArg> {
        self.args
            .into_iter()
            .map(|(keyword, value)| FieldArg { keyword, value })
            .collect()
    }
}

/// Collect the constraints of a property, then of its scalar type chain or
/// model type, then its description.
pub fn extract_constraints(graph: &TypeGraph, prop: &Property) -> ConstraintSet {
    let mut set = ConstraintSet::default();
    set.extend_from(&prop.constraints);

    match graph.get(prop.ty) {
        Type::Scalar(_) => {
            for scalar in graph.scalar_chain(prop.ty) {
                if let Type::Scalar(s) = graph.get(scalar) {
                    set.extend_from(&s.constraints);
                }
            }
        }
        Type::Model(model) => set.extend_from(&model.constraints),
        _ => {}
    }

    if let Some(doc) = &prop.doc {
        set.insert("description", PyLiteral::Str(doc.clone()));
    }
    set
}
