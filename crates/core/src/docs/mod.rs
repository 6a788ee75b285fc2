//! HTTP API reference emitter.
//!
//! Renders one Markdown document per HTTP service: operations grouped by
//! interface, parameter and property tables, synthetic JSON examples and a
//! shared section for error responses most operations return.
//!
//! ## Module Structure
//!
//! - `example`: synthetic JSON values for payload types
//! - `markdown`: service -> Markdown document
//! - `emitter`: service discovery, file naming and emission

mod emitter;
mod example;
mod markdown;

pub use emitter::{discover_services, emit_api_docs, render_api_docs, resolve_output_file};
pub use example::{MAX_EXAMPLE_DEPTH, example_of};
pub use markdown::{
    escape_for_table, is_json_content_type, render_service, status_description, type_name,
};
