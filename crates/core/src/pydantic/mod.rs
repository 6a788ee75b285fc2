//! Pydantic model emitter.
//!
//! Turns the declared models, enums and named unions of a program into Python
//! modules split by usage (input, output, roundtrip).
//!
//! ## Module Structure
//!
//! - `types`: Python IR (PyType, PyDecl, PyModule)
//! - `mapper`: graph type -> PyType, plus emitted declaration names
//! - `constraints`: validation metadata -> `Field` keyword arguments
//! - `codegen`: graph declarations -> PyDecl
//! - `module`: declaration ordering and import derivation
//! - `emit`: IR -> Python source (via Emit trait)
//! - `emitter`: bucketing and file emission
//! - `utils`: identifiers and string literals

mod codegen;
mod constraints;
mod emit;
mod emitter;
mod mapper;
mod module;
pub mod types;
pub mod utils;

pub use constraints::{ConstraintSet, extract_constraints};
pub use emit::Emit;
pub use emitter::{DeclaredTypes, collect_types, emit_pydantic, is_declarable, render_pydantic};
pub use mapper::{DeclNames, TypeMapper};
pub use module::{codegen_module, order_models};
pub use types::{PyModule, PyPrimitive, PyType};
