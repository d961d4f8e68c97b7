use crate::assemble::ast::VariableOperation;
use crate::jvm::{BaseType, FieldType};
use std::fmt;

/// Broad category of a type, as far as local variable slots are concerned
///
/// These are the same categories the JVM verifier uses for locals: everything `int`-like (and
/// narrower) is lumped together, as is everything that is a reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Int,
    Float,
    Long,
    Double,
    Reference,
}

impl From<&FieldType> for TypeCategory {
    fn from(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Base(BaseType::Int)
            | FieldType::Base(BaseType::Char)
            | FieldType::Base(BaseType::Short)
            | FieldType::Base(BaseType::Byte)
            | FieldType::Base(BaseType::Boolean) => TypeCategory::Int,
            FieldType::Base(BaseType::Float) => TypeCategory::Float,
            FieldType::Base(BaseType::Long) => TypeCategory::Long,
            FieldType::Base(BaseType::Double) => TypeCategory::Double,
            FieldType::Ref(_) => TypeCategory::Reference,
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeCategory::Int => "int",
            TypeCategory::Float => "float",
            TypeCategory::Long => "long",
            TypeCategory::Double => "double",
            TypeCategory::Reference => "reference",
        })
    }
}

/// A variable usage disagrees with the type the variable was last used with
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error(
    "cannot {operation} '{}' ({}) with prior '{}' ({}) value",
    .incoming.sort_name(),
    TypeCategory::from(.incoming),
    .existing.sort_name(),
    TypeCategory::from(.existing)
)]
pub struct TypeConflict {
    pub operation: VariableOperation,

    /// Last type the variable was used with
    pub existing: FieldType,

    /// Type implied by the conflicting usage
    pub incoming: FieldType,
}

/// Decides whether a new usage of a variable is compatible with how it was last used
///
/// The class file does not record static types for local slots, so this only exists to catch
/// mistakes in assembler source before they turn into an unverifiable method. It is permissive
/// within a [`TypeCategory`] and strict across categories:
///
///   - the first usage of a variable is always fine
///   - an assignment is always fine (it starts a new typed scope for the slot)
///   - an update (`iinc`) needs the variable to currently hold an `int`-like value
///   - a read needs the same category as the current value
///
pub struct TypeReconciler;

impl TypeReconciler {
    /// Check a usage, returning the type that should be recorded for it
    pub fn reconcile(
        existing: Option<&FieldType>,
        operation: VariableOperation,
        incoming: &FieldType,
    ) -> Result<FieldType, TypeConflict> {
        let existing = match existing {
            None => return Ok(incoming.clone()),
            Some(existing) => existing,
        };

        let compatible = match operation {
            VariableOperation::Assign => true,
            VariableOperation::Update => TypeCategory::from(existing) == TypeCategory::Int,
            VariableOperation::Read => TypeCategory::from(existing) == TypeCategory::from(incoming),
        };

        if compatible {
            Ok(incoming.clone())
        } else {
            Err(TypeConflict {
                operation,
                existing: existing.clone(),
                incoming: incoming.clone(),
            })
        }
    }
}
