use crate::assemble::analysis::{AnalysisError, AnalysisErrorKind};
use crate::assemble::ast::Element;
use crate::assemble::variables::{AllocationConflict, TypeConflict};

/// A method could not be assembled
///
/// Every kind of failure is final for the method: nothing is retried and no partial table is
/// meant to be used afterwards.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{element}: {kind}")]
pub struct MethodCompileError {
    /// Part of the method the error is about
    pub element: Element,
    pub kind: CompileErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileErrorKind {
    #[error(transparent)]
    AllocationConflict(AllocationConflict),

    #[error("incompatible variable type usage [{slot}:{identifier}]: {conflict}")]
    TypeConflict {
        slot: usize,
        identifier: String,
        conflict: TypeConflict,
    },

    #[error("data-flow analysis failed: {0}")]
    AnalysisFailure(AnalysisErrorKind),
}

impl From<AnalysisError> for MethodCompileError {
    fn from(error: AnalysisError) -> MethodCompileError {
        MethodCompileError {
            element: error.element,
            kind: CompileErrorKind::AnalysisFailure(error.kind),
        }
    }
}
