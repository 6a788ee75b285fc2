//! Code generation from a resolved schema type graph.
//!
//! A host compiler hands over its program as a JSON document describing
//! namespaces, models, enums, unions, scalars and HTTP operations. This crate
//! loads it into a read-only [`TypeGraph`] and runs the emitters over it:
//!
//! - [`pydantic`]: Python modules of pydantic models, split by usage
//! - [`docs`]: Markdown reference documents for HTTP services
//!
//! Emitters render every artifact in memory first and then write through an
//! [`EmitHost`].

pub mod config;
pub mod docs;
pub mod error;
pub mod graph;
pub mod host;
pub mod pydantic;
pub mod usage;

pub use config::{DocsOptions, EmitterKind, ProjectConfig, PydanticOptions};
pub use error::{ConfigError, EmitError, GraphError};
pub use graph::TypeGraph;
pub use host::{EmitHost, FsHost, LineEnding, MemoryHost};
pub use usage::{Usage, UsageMap, classify};
