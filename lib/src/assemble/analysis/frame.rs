use super::{AnalysisErrorKind, InheritanceChecker, Value};
use crate::util::Width;
use std::collections::BTreeMap;

/// Snapshot of the local variables and operand stack at a point in a method body
///
/// Locals are keyed by their name in the assembler source, not by slot: slots are only assigned
/// once the variable table is built, and the table is what consumes these frames.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Frame {
    locals: BTreeMap<String, Value>,
    stack: Vec<Value>,
}

impl Frame {
    pub fn new() -> Frame {
        Frame::default()
    }

    /// Value of a local variable, if the variable is defined at this point
    pub fn local(&self, identifier: &str) -> Option<&Value> {
        self.locals.get(identifier)
    }

    /// Values on the stack, from bottom to top
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn set_local(&mut self, identifier: &str, value: Value) {
        match self.locals.get_mut(identifier) {
            Some(existing) => *existing = value,
            None => {
                self.locals.insert(identifier.to_owned(), value);
            }
        }
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, AnalysisErrorKind> {
        self.stack.pop().ok_or(AnalysisErrorKind::EmptyStack)
    }

    /// Pop a value, checking that it has the expected width
    pub fn pop_width(&mut self, expected: usize) -> Result<Value, AnalysisErrorKind> {
        let value = self.pop()?;
        let found = value.width();
        if found == expected {
            Ok(value)
        } else {
            Err(AnalysisErrorKind::InvalidWidth { expected, found })
        }
    }

    /// Replace every copy of a value in both the stack and the locals
    pub fn replace_all(&mut self, target: &Value, replacement: &Value) {
        let values = self.stack.iter_mut().chain(self.locals.values_mut());
        for value in values {
            if value == target {
                *value = replacement.clone();
            }
        }
    }

    /// Merge another frame flowing into the same instruction into this one
    ///
    /// Returns whether this frame changed. Locals that are only defined in one of the frames
    /// become [`Value::Top`].
    pub fn merge(
        &mut self,
        other: &Frame,
        inheritance: Option<&dyn InheritanceChecker>,
    ) -> Result<bool, AnalysisErrorKind> {
        if self.stack.len() != other.stack.len() {
            return Err(AnalysisErrorKind::StackHeightMismatch {
                expected: self.stack.len(),
                found: other.stack.len(),
            });
        }

        let mut changed = false;
        for (value, other_value) in self.stack.iter_mut().zip(&other.stack) {
            let merged = value.merge(other_value, inheritance)?;
            if merged != *value {
                *value = merged;
                changed = true;
            }
        }

        for (name, value) in self.locals.iter_mut() {
            let merged = match other.locals.get(name) {
                Some(other_value) => value.merge(other_value, inheritance)?,
                None => Value::Top,
            };
            if merged != *value {
                *value = merged;
                changed = true;
            }
        }
        for name in other.locals.keys() {
            if !self.locals.contains_key(name) {
                self.locals.insert(name.clone(), Value::Top);
                changed = true;
            }
        }

        Ok(changed)
    }
}
