//! Markdown rendering of one HTTP service.
//!
//! Layout: title, service doc, servers, operations grouped by interface, then
//! the shared "Common Errors" section. Error responses that most operations
//! return are documented once and linked from each operation.

use indexmap::IndexMap;

use super::example::example_of;
use crate::graph::{
    EnumValue, HttpBody, HttpResponse, HttpService, IndexKey, Model, Operation, StatusCode, Type,
    TypeGraph, TypeId,
};

/// Enums and unions with more members than this are shown by name.
const MAX_INLINE_VARIANTS: usize = 10;

/// Guards type-name rendering against self-referencing unions.
const MAX_NAME_DEPTH: usize = 8;

/// Render the full reference document of a service.
pub fn render_service(graph: &TypeGraph, service: &HttpService) -> String {
    let namespace = graph.namespace(service.namespace);
    let title = service
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| Some(namespace.name.clone()).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| "API".to_string());

    let mut lines = vec![format!("# {title} API Reference"), String::new()];

    if let Some(doc) = &namespace.doc {
        lines.push(doc.clone());
        lines.push(String::new());
    }

    if !namespace.servers.is_empty() {
        lines.push("## Server".to_string());
        lines.push(String::new());
        for server in &namespace.servers {
            match &server.description {
                Some(desc) => lines.push(format!("- `{}` - {desc}", server.url)),
                None => lines.push(format!("- `{}`", server.url)),
            }
        }
        lines.push(String::new());
    }

    let groups = group_operations(graph, service);
    let operations: Vec<&Operation> = groups.values().flatten().copied().collect();
    let common = find_common_errors(graph, &operations);

    for (group, ops) in &groups {
        if !group.is_empty() {
            lines.push(format!("## {group}"));
            lines.push(String::new());
        }
        for op in ops {
            operation_doc(graph, op, &common, &mut lines);
        }
    }

    if !common.is_empty() {
        lines.push("## Common Errors".to_string());
        lines.push(String::new());
        lines.push("The following error responses apply to all operations in this API.".to_string());
        lines.push(String::new());
        for entry in common.values() {
            lines.extend(entry.iter().cloned());
        }
    }

    let mut out = lines.join("\n");
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Operations keyed by interface name, in first-seen order. Namespace-level
/// operations share the `""` group.
fn group_operations<'g>(
    graph: &'g TypeGraph,
    service: &HttpService,
) -> IndexMap<&'g str, Vec<&'g Operation>> {
    let mut groups: IndexMap<&str, Vec<&Operation>> = IndexMap::new();
    for id in &service.operations {
        let op = graph.operation(*id);
        groups.entry(op.group_name()).or_default().push(op);
    }
    groups
}

/// Error responses shared by at least half of the operations, keyed by
/// fingerprint, with their rendered documentation.
fn find_common_errors(graph: &TypeGraph, operations: &[&Operation]) -> IndexMap<String, Vec<String>> {
    let mut common = IndexMap::new();
    if operations.len() <= 1 {
        return common;
    }

    let mut counts: IndexMap<String, (usize, &HttpResponse)> = IndexMap::new();
    for op in operations {
        let mut seen = Vec::new();
        for response in op.responses.iter().filter(|r| r.status.is_error()) {
            let fp = fingerprint(graph, response);
            if seen.contains(&fp) {
                continue;
            }
            counts.entry(fp.clone()).or_insert((0, response)).0 += 1;
            seen.push(fp);
        }
    }

    let threshold = operations.len().div_ceil(2);
    for (fp, (count, response)) in counts {
        if count >= threshold {
            let mut lines = Vec::new();
            response_doc(graph, response, &mut lines);
            common.insert(fp, lines);
        }
    }
    common
}

/// `status|BodyType,prop:type,...`
fn fingerprint(graph: &TypeGraph, response: &HttpResponse) -> String {
    let mut parts = Vec::new();
    for body in &response.bodies {
        parts.push(type_name(graph, body.ty));
        if let Type::Model(model) = graph.get(body.ty) {
            for (name, prop) in &model.properties {
                parts.push(format!("{name}:{}", type_name(graph, prop.ty)));
            }
        }
    }
    format!("{}|{}", response.status, parts.join(","))
}

fn operation_doc(
    graph: &TypeGraph,
    op: &Operation,
    common: &IndexMap<String, Vec<String>>,
    lines: &mut Vec<String>,
) {
    let heading = op.summary.as_deref().unwrap_or(&op.name);
    lines.push(format!("### {heading}"));
    lines.push(String::new());
    lines.push(format!("`{} {}`", op.verb.as_str(), op.path));
    lines.push(String::new());

    if let Some(doc) = &op.doc {
        lines.push(doc.clone());
        lines.push(String::new());
    }

    if !op.parameters.is_empty() {
        lines.push("#### Parameters".to_string());
        lines.push(String::new());
        lines.push("| Name | In | Type | Required | Description |".to_string());
        lines.push("| --- | --- | --- | --- | --- |".to_string());
        for param in &op.parameters {
            let description = describe(graph, param.doc.as_deref(), param.ty);
            lines.push(format!(
                "| {} | {} | `{}` | {} | {} |",
                escape_for_table(&param.name),
                param.location.as_str(),
                escape_for_table(&type_name(graph, param.ty)),
                required(param.optional),
                escape_for_table(&description),
            ));
        }
        lines.push(String::new());
    }

    if let Some(body) = &op.body
        && !matches!(graph.get(body.ty), Type::Intrinsic(_))
    {
        lines.push("#### Request Body".to_string());
        lines.push(String::new());
        body_doc(graph, body, lines);
    }

    if !op.responses.is_empty() {
        let mut unique = Vec::new();
        let mut skipped = Vec::new();
        for response in &op.responses {
            if response.status.is_error() && common.contains_key(&fingerprint(graph, response)) {
                skipped.push(response.status.to_string());
            } else {
                unique.push(response);
            }
        }

        lines.push("#### Responses".to_string());
        lines.push(String::new());
        for response in unique {
            response_doc(graph, response, lines);
        }
        if !skipped.is_empty() {
            lines.push(format!(
                "This operation also returns [common errors](#common-errors) ({}).",
                skipped.join(", ")
            ));
            lines.push(String::new());
        }
    }

    lines.push("---".to_string());
    lines.push(String::new());
}

fn response_doc(graph: &TypeGraph, response: &HttpResponse, lines: &mut Vec<String>) {
    let description = response
        .description
        .as_deref()
        .or_else(|| status_description(response.status));
    match description {
        Some(desc) => lines.push(format!("##### {} {desc}", response.status)),
        None => lines.push(format!("##### {}", response.status)),
    }
    lines.push(String::new());

    for body in &response.bodies {
        body_doc(graph, body, lines);
    }
}

/// Content types, JSON example and property table of a payload.
fn body_doc(graph: &TypeGraph, body: &HttpBody, lines: &mut Vec<String>) {
    if !body.content_types.is_empty() {
        lines.push(format!("Content-Type: {}", body.content_types.join(", ")));
        lines.push(String::new());
    }

    if is_json_content_type(&body.content_types)
        && let Some(example) = example_of(graph, body.ty, 0)
        && let Ok(pretty) = serde_json::to_string_pretty(&example)
    {
        lines.push("```json".to_string());
        lines.push(pretty);
        lines.push("```".to_string());
        lines.push(String::new());
    }

    if let Type::Model(model) = graph.get(body.ty)
        && !model.properties.is_empty()
    {
        property_table(graph, model, lines);
    }
}

fn property_table(graph: &TypeGraph, model: &Model, lines: &mut Vec<String>) {
    lines.push("| Property | Type | Required | Description |".to_string());
    lines.push("| --- | --- | --- | --- |".to_string());
    for (name, prop) in &model.properties {
        let description = describe(graph, prop.doc.as_deref(), prop.ty);
        lines.push(format!(
            "| {} | `{}` | {} | {} |",
            escape_for_table(name),
            escape_for_table(&type_name(graph, prop.ty)),
            required(prop.optional),
            escape_for_table(&description),
        ));
    }
    lines.push(String::new());
}

fn required(optional: bool) -> &'static str {
    if optional { "No" } else { "Yes" }
}

/// Standard description of a status code, or of its class.
pub fn status_description(status: StatusCode) -> Option<&'static str> {
    let (start, end) = match status {
        StatusCode::Code(code) => (code, code),
        StatusCode::Range { start, end } => (start, end),
        StatusCode::Wildcard => return None,
    };
    if start == end {
        let known = match start {
            200 => Some("The request has succeeded."),
            201 => Some("The request has succeeded and a new resource has been created as a result."),
            202 => Some(
                "The request has been accepted for processing, but processing has not yet completed.",
            ),
            204 => Some("There is no content to send for this request, but the headers may be useful."),
            301 => Some(
                "The URL of the requested resource has been changed permanently. The new URL is given in the response.",
            ),
            304 => Some(
                "The client has made a conditional request and the resource has not been modified.",
            ),
            400 => Some("The server could not understand the request due to invalid syntax."),
            401 => Some("Access is unauthorized."),
            403 => Some("Access is forbidden."),
            404 => Some("The server cannot find the requested resource."),
            409 => Some("The request conflicts with the current state of the server."),
            412 => Some("Precondition failed."),
            503 => Some("Service unavailable."),
            _ => None,
        };
        if known.is_some() {
            return known;
        }
    }
    match (start, end) {
        (100.., ..=199) => Some("Informational"),
        (200.., ..=299) => Some("Successful"),
        (300.., ..=399) => Some("Redirection"),
        (400.., ..=499) => Some("Client error"),
        (500.., ..=599) => Some("Server error"),
        _ => None,
    }
}

/// No content types at all counts as JSON.
pub fn is_json_content_type(content_types: &[String]) -> bool {
    content_types.is_empty()
        || content_types
            .iter()
            .any(|ct| ct == "application/json" || ct.ends_with("+json"))
}

/// Keep a value on one table row and out of the column separators.
pub fn escape_for_table(value: &str) -> String {
    value
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
        .replace('|', "\\|")
}

/// JSON-flavored display name of a type: `string`, `int32[]`, `"a" | "b"`, `object`.
pub fn type_name(graph: &TypeGraph, id: TypeId) -> String {
    type_name_at(graph, id, 0)
}

fn type_name_at(graph: &TypeGraph, id: TypeId, depth: usize) -> String {
    let ty = graph.get(id);
    if depth >= MAX_NAME_DEPTH {
        return ty.name().unwrap_or("unknown").to_string();
    }
    match ty {
        Type::Scalar(s) => s.name.clone(),
        Type::Model(model) => match model.array_element() {
            Some(element) => format!("{}[]", type_name_at(graph, element, depth + 1)),
            None => "object".to_string(),
        },
        Type::Enum(e) => {
            if e.members.len() > MAX_INLINE_VARIANTS {
                return e.name.clone();
            }
            e.members
                .iter()
                .map(|m| match m.effective_value() {
                    EnumValue::String(s) => format!("\"{s}\""),
                    EnumValue::Number(n) => n.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" | ")
        }
        Type::Union(union) => {
            if union.variants.len() > MAX_INLINE_VARIANTS
                && let Some(name) = &union.name
            {
                return name.clone();
            }
            union
                .variants
                .iter()
                .map(|v| type_name_at(graph, v.ty, depth + 1))
                .collect::<Vec<_>>()
                .join(" | ")
        }
        Type::Intrinsic(i) => i.as_str().to_string(),
        Type::StringLiteral(s) => format!("\"{s}\""),
        Type::NumberLiteral(n) => n.to_string(),
        Type::BooleanLiteral(b) => b.to_string(),
    }
}

/// Extra text for types whose display name hides their shape.
fn type_description(graph: &TypeGraph, id: TypeId, depth: usize) -> Option<String> {
    if depth >= MAX_NAME_DEPTH {
        return None;
    }
    match graph.get(id) {
        Type::Model(model) => model
            .indexer
            .filter(|i| i.key == IndexKey::String)
            .map(|i| format!("A map of string keys to {} values.", type_name(graph, i.value))),
        Type::Union(union) => union
            .variants
            .iter()
            .find_map(|v| type_description(graph, v.ty, depth + 1)),
        _ => None,
    }
}

/// `{type description} {doc}`, either part optional.
fn describe(graph: &TypeGraph, doc: Option<&str>, id: TypeId) -> String {
    let doc = doc.unwrap_or_default();
    match type_description(graph, id, 0) {
        Some(desc) if doc.is_empty() => desc,
        Some(desc) => format!("{desc} {doc}"),
        None => doc.to_string(),
    }
}
