//! Semantic analysis of assembler methods
//!
//! A parsed method ([`ast::Unit`]) refers to its locals by name. Before bytecode can be emitted,
//! every name needs a slot, and every slot needs a type that is consistent across the method.
//! [`variables::VariableTable`] does that work, leaning on [`analysis`] to figure out precise
//! types for reference variables.

pub mod analysis;
pub mod ast;
mod errors;
pub mod variables;

pub use errors::*;
