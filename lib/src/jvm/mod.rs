//! JVM vocabulary shared by the assembler
//!
//! Everything in here is about the class file format itself rather than about assembling: class
//! and member names, type descriptors (and how wide they are in local variable slots), access
//! flags, and a [`class_graph::ClassGraph`] for answering inheritance questions.
//!
//! ```
//! use jasm::jvm::*;
//!
//! let descriptor = MethodDescriptor::parse("(JLjava/lang/String;)V").unwrap();
//! assert_eq!(descriptor.parameters[0], FieldType::LONG);
//! assert_eq!(descriptor.parameter_length(true), 4);
//! assert_eq!(descriptor.render(), "(JLjava/lang/String;)V");
//! ```

mod access_flags;
pub mod class_graph;
mod descriptors;
mod names;

pub use access_flags::*;
pub use descriptors::*;
pub use names::*;
