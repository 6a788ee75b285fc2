//! HTTP operation descriptors attached to the type graph.
//!
//! These are the already-resolved results of the host's HTTP library: verbs,
//! paths, parameters and responses. Route derivation itself happens upstream.

use std::fmt;

use serde::Deserialize;

use super::types::{NamespaceId, TypeId};

/// Arena index of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub(crate) usize);

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Head => "HEAD",
        }
    }
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

/// Where an operation was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Namespace(NamespaceId),
    Interface { namespace: NamespaceId, name: String },
}

#[derive(Debug, Clone)]
pub struct HttpParameter {
    pub name: String,
    pub location: ParamLocation,
    pub ty: TypeId,
    pub optional: bool,
    pub doc: Option<String>,
}

/// A request or response payload.
#[derive(Debug, Clone)]
pub struct HttpBody {
    pub ty: TypeId,
    pub content_types: Vec<String>,
}

/// Status code of a response: exact code, inclusive range, or wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Code(u16),
    Range { start: u16, end: u16 },
    Wildcard,
}

impl StatusCode {
    /// 4xx, 5xx and the `*` catch-all count as error responses.
    pub fn is_error(&self) -> bool {
        match self {
            StatusCode::Code(code) => *code >= 400,
            StatusCode::Range { start, .. } => *start >= 400,
            StatusCode::Wildcard => true,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Code(code) => write!(f, "{code}"),
            StatusCode::Range { start, end } => write!(f, "{start}-{end}"),
            StatusCode::Wildcard => f.write_str("*"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub description: Option<String>,
    pub bodies: Vec<HttpBody>,
}

/// A resolved HTTP operation.
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub container: Container,
    pub verb: HttpVerb,
    pub path: String,
    pub doc: Option<String>,
    pub summary: Option<String>,
    pub parameters: Vec<HttpParameter>,
    pub body: Option<HttpBody>,
    pub responses: Vec<HttpResponse>,
}

impl Operation {
    /// Interface name the operation is grouped under, or `""` for namespace-level ops.
    pub fn group_name(&self) -> &str {
        match &self.container {
            Container::Interface { name, .. } => name,
            Container::Namespace(_) => "",
        }
    }
}

/// A server entry declared on a service namespace.
#[derive(Debug, Clone)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
}

/// An HTTP service: a namespace marked as a service plus every operation in its subtree.
#[derive(Debug, Clone)]
pub struct HttpService {
    pub namespace: NamespaceId,
    pub title: Option<String>,
    pub operations: Vec<OperationId>,
}
