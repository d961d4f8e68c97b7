//! Data-flow analysis of method bodies
//!
//! To know the precise type of a reference variable at some point in a method, the method has to
//! be simulated: every instruction is interpreted over abstract [`Value`]s, producing a [`Frame`]
//! (the locals and the operand stack) after each instruction. Where control flow joins (the target
//! of a jump), the frames flowing in are merged. This is iterated until nothing changes anymore.
//!
//! Merging two different object types requires knowing their common supertype, which is what the
//! optional [`InheritanceChecker`] is for. Without one, merged object types fall back to
//! `java/lang/Object`.
//!
//! The variable table only depends on the [`FrameAnalyzer`] trait. [`Analyzer`] is the
//! implementation that ships with the crate.

mod analyzer;
mod frame;
mod value;

pub use analyzer::*;
pub use frame::*;
pub use value::*;

use crate::assemble::ast::{Element, Instruction, Unit};
use crate::jvm::class_graph::{ClassGraph, MissingClass};
use crate::jvm::BinaryName;

/// Produces frames for every instruction in a method body
pub trait FrameAnalyzer {
    fn analyze(&self, unit: &Unit) -> Result<Analysis, AnalysisError>;
}

/// Answers inheritance questions needed to merge object types
pub trait InheritanceChecker {
    /// Most specific class both types are assignable to
    fn common_type(
        &self,
        first: &BinaryName,
        second: &BinaryName,
    ) -> Result<BinaryName, MissingClass>;
}

impl InheritanceChecker for ClassGraph {
    fn common_type(
        &self,
        first: &BinaryName,
        second: &BinaryName,
    ) -> Result<BinaryName, MissingClass> {
        self.common_superclass(first, second)
    }
}

/// Expands inline helper expressions into the instructions they stand for
pub trait ExpressionExpander {
    fn expand(&self, unit: &Unit, expression: &str) -> Result<Vec<Instruction>, String>;
}

/// Result of analyzing a method body
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Frame after each instruction (`None` for instructions that are never reached)
    frames: Vec<Option<Frame>>,
}

impl Analysis {
    pub fn new(frames: Vec<Option<Frame>>) -> Analysis {
        Analysis { frames }
    }

    /// State of the locals and stack right after the instruction at the given index executes
    pub fn frame(&self, instruction_index: usize) -> Option<&Frame> {
        self.frames.get(instruction_index).and_then(Option::as_ref)
    }
}

/// Simulating a method body failed
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{element}: {kind}")]
pub struct AnalysisError {
    pub element: Element,
    pub kind: AnalysisErrorKind,
}

impl AnalysisError {
    pub fn new(instruction_index: usize, kind: AnalysisErrorKind) -> AnalysisError {
        AnalysisError {
            element: Element::Instruction(instruction_index),
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisErrorKind {
    #[error("cannot pop from an empty stack")]
    EmptyStack,

    #[error("expected a value of width {expected} on the stack, but found width {found}")]
    InvalidWidth { expected: usize, found: usize },

    #[error("cannot merge stacks of height {expected} and {found}")]
    StackHeightMismatch { expected: usize, found: usize },

    #[error("jump to undeclared label '{0}'")]
    UnknownLabel(String),

    #[error("label '{0}' is declared more than once")]
    DuplicateLabel(String),

    #[error(transparent)]
    MissingClass(#[from] MissingClass),

    #[error("no expression expander to expand '{0}'")]
    UnexpandedExpression(String),

    #[error("failed to expand expression: {0}")]
    Expansion(String),
}
