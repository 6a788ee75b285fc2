//! Synthetic JSON examples for request and response bodies.

use serde_json::{Map, Value, json};

use crate::graph::{EnumValue, IndexKey, Intrinsic, Type, TypeGraph, TypeId};

/// Nesting depth past which examples collapse to `{}`.
pub const MAX_EXAMPLE_DEPTH: usize = 6;

/// Build an example value for a type.
///
/// Returns `None` for types that have no value (`void`, `never`); such
/// properties are left out of their parent object.
pub fn example_of(graph: &TypeGraph, id: TypeId, depth: usize) -> Option<Value> {
    if depth >= MAX_EXAMPLE_DEPTH {
        return Some(Value::Object(Map::new()));
    }
    match graph.get(id) {
        Type::Model(model) => {
            if let Some(element) = model.array_element() {
                let item = example_of(graph, element, depth + 1).unwrap_or(Value::Null);
                return Some(Value::Array(vec![item]));
            }
            if let Some(indexer) = model.indexer.filter(|i| i.key == IndexKey::String) {
                let mut map = Map::new();
                if let Some(value) = example_of(graph, indexer.value, depth + 1) {
                    map.insert("key".to_string(), value);
                }
                return Some(Value::Object(map));
            }
            let mut map = Map::new();
            for (name, prop) in &model.properties {
                if let Some(value) = example_of(graph, prop.ty, depth + 1) {
                    map.insert(name.clone(), value);
                }
            }
            Some(Value::Object(map))
        }
        Type::Scalar(_) => Some(scalar_example(graph, id)),
        Type::Enum(e) => Some(match e.members.first() {
            Some(member) => match member.effective_value() {
                EnumValue::String(s) => Value::String(s),
                EnumValue::Number(n) => Value::Number(n),
            },
            None => Value::String("string".to_string()),
        }),
        // Unwrapping a union variant is not nesting, so depth stays put.
        Type::Union(union) => match union.variants.iter().find(|v| !graph.get(v.ty).is_null()) {
            Some(variant) => example_of(graph, variant.ty, depth),
            None => Some(Value::Null),
        },
        Type::Intrinsic(Intrinsic::Void | Intrinsic::Never) => None,
        Type::Intrinsic(Intrinsic::Null) => Some(Value::Null),
        Type::Intrinsic(Intrinsic::Unknown | Intrinsic::ErrorType) => {
            Some(Value::Object(Map::new()))
        }
        Type::StringLiteral(s) => Some(Value::String(s.clone())),
        Type::NumberLiteral(n) => Some(Value::Number(n.clone())),
        Type::BooleanLiteral(b) => Some(Value::Bool(*b)),
    }
}

fn scalar_example(graph: &TypeGraph, id: TypeId) -> Value {
    graph
        .scalar_chain(id)
        .into_iter()
        .find_map(|s| graph.get(s).name().and_then(scalar_literal))
        .unwrap_or_else(|| json!("string"))
}

fn scalar_literal(name: &str) -> Option<Value> {
    let value = match name {
        "string" => json!("string"),
        "boolean" => json!(false),
        "int8" | "int16" | "int32" | "int64" | "uint8" | "uint16" | "uint32" | "uint64"
        | "safeint" | "integer" | "numeric" => json!(0),
        "float" | "float16" | "float32" | "float64" | "decimal" | "decimal128" => json!(0.0),
        "plainDate" => json!("2024-01-01"),
        "plainTime" => json!("12:00:00"),
        "utcDateTime" | "offsetDateTime" => json!("2024-01-01T00:00:00Z"),
        "duration" => json!("PT1H"),
        "bytes" => json!("base64EncodedString"),
        "url" => json!("https://example.com"),
        _ => return None,
    };
    Some(value)
}
