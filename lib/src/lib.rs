//! Semantic analysis of local variables for a JVM bytecode assembler
//!
//! Assembler source refers to local variables by name (`aload name`, `istore count`), but the
//! class file format only knows about numbered local slots. This crate resolves a parsed method
//! body into a concrete slot table:
//!
//!   - the receiver (`this`) and declared parameters are bound first, in declaration order
//!   - every load/store/increment in the body is then checked against the type the slot was last
//!     used with, and new names are handed the next free slot
//!   - finally, a data-flow analysis of the body replaces the coarse `java/lang/Object` type of
//!     reference variables with the most precise type it can prove
//!
//! Along the way, the constraints of the format are enforced: `long` and `double` take up two
//! slots (and the second one can never be addressed on its own) and loads must agree with the
//! category of what was stored.
//!
//! ### Simple example
//!
//! ```
//! use jasm::assemble::analysis::Analyzer;
//! use jasm::assemble::ast::*;
//! use jasm::assemble::variables::VariableTable;
//! use jasm::jvm::*;
//!
//! # fn main() -> Result<(), jasm::assemble::MethodCompileError> {
//! // static String greet(long times)
//! let definition = MethodDefinition::new(
//!     "greet",
//!     MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
//!     vec![MethodParameter::new("times", FieldType::LONG)],
//!     Some(FieldType::STRING),
//! );
//! let code = Code::new(vec![
//!     Instruction::Ldc(Constant::String(String::from("hello"))),
//!     Instruction::AStore(String::from("message")),
//!     Instruction::ALoad(String::from("message")),
//!     Instruction::AReturn,
//! ]);
//! let unit = Unit::new(BinaryName::from_string(String::from("me/alec/Greeter")).unwrap(), definition, code);
//!
//! let mut variables = VariableTable::new();
//! variables.resolve(&unit, &Analyzer::new())?;
//!
//! // `times` is a `long`, so it takes slots 0 and 1
//! assert_eq!(variables.index_of("times"), Some(0));
//! assert_eq!(variables.index_of("message"), Some(2));
//! assert_eq!(variables.max_locals(), 3);
//!
//! // The data-flow analysis proved that `message` is always a string
//! let message = variables.by_name("message").unwrap();
//! assert_eq!(message.last_used_type(), &FieldType::STRING);
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod jvm;
mod util;

pub use util::Width;
