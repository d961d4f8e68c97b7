use super::{
    Analysis, AnalysisError, AnalysisErrorKind, ExpressionExpander, Frame, FrameAnalyzer,
    InheritanceChecker, Value,
};
use crate::assemble::ast::{Constant, Element, Instruction, InvokeType, MethodRef, Unit};
use crate::jvm::{FieldType, RefType, UnqualifiedName};
use crate::util::Width;
use std::collections::HashMap;

/// Worklist-based abstract interpreter over method bodies
///
/// Both collaborators are optional. Without an inheritance checker, distinct object types merge
/// to `java/lang/Object`. Without an expression expander, any [`Instruction::Expression`] in a
/// reachable part of the body is an error.
#[derive(Default, Clone, Copy)]
pub struct Analyzer<'a> {
    inheritance: Option<&'a dyn InheritanceChecker>,
    expander: Option<&'a dyn ExpressionExpander>,
}

impl<'a> Analyzer<'a> {
    pub fn new() -> Analyzer<'a> {
        Analyzer::default()
    }

    pub fn with_inheritance_checker(mut self, inheritance: &'a dyn InheritanceChecker) -> Self {
        self.inheritance = Some(inheritance);
        self
    }

    pub fn with_expression_expander(mut self, expander: &'a dyn ExpressionExpander) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Locals on entry to the method: the receiver followed by the parameters
    fn entry_frame(unit: &Unit) -> Frame {
        let mut frame = Frame::new();
        let definition = &unit.definition;
        if !definition.is_static() {
            let this = if definition.is_constructor() {
                Value::UninitializedThis(unit.owner.clone())
            } else {
                Value::Object(RefType::Object(unit.owner.clone()))
            };
            frame.set_local("this", this);
        }
        for parameter in &definition.parameters {
            frame.set_local(&parameter.name, Value::from(&parameter.descriptor));
        }
        frame
    }

    /// Indices of instructions that can execute right after the one at `index`
    fn successors(
        unit: &Unit,
        index: usize,
        labels: &HashMap<&str, usize>,
    ) -> Result<Vec<usize>, AnalysisErrorKind> {
        let instruction = &unit.code.instructions[index];
        let mut successors = Vec::with_capacity(2);
        if let Some(label) = instruction.jump_target() {
            let target = labels
                .get(label)
                .copied()
                .ok_or_else(|| AnalysisErrorKind::UnknownLabel(label.to_owned()))?;
            successors.push(target);
        }
        if instruction.falls_through() && index + 1 < unit.code.instructions.len() {
            successors.push(index + 1);
        }
        Ok(successors)
    }

    /// Simulate the effect of one instruction on a frame
    fn execute(
        &self,
        unit: &Unit,
        instruction: &Instruction,
        frame: &mut Frame,
    ) -> Result<(), AnalysisErrorKind> {
        use Instruction::*;

        match instruction {
            Label(_) | Nop | Goto(_) | Return => (),

            AConstNull => frame.push(Value::Null),
            IConst(_) => frame.push(Value::Int),
            LConst(_) => frame.push(Value::Long),
            FConst(_) => frame.push(Value::Float),
            DConst(_) => frame.push(Value::Double),
            Ldc(constant) => frame.push(match constant {
                Constant::Integer(_) => Value::Int,
                Constant::Long(_) => Value::Long,
                Constant::Float(_) => Value::Float,
                Constant::Double(_) => Value::Double,
                Constant::String(string) => Value::StringConstant(string.clone()),
                Constant::Class(class) => Value::ClassConstant(class.clone()),
            }),

            ILoad(_) => frame.push(Value::Int),
            LLoad(_) => frame.push(Value::Long),
            FLoad(_) => frame.push(Value::Float),
            DLoad(_) => frame.push(Value::Double),
            ALoad(identifier) => {
                let value = match frame.local(identifier) {
                    Some(value) if value.is_reference() => value.clone(),
                    _ => Value::Top,
                };
                frame.push(value);
            }
            IStore(identifier) => {
                frame.pop_width(1)?;
                frame.set_local(identifier, Value::Int);
            }
            LStore(identifier) => {
                frame.pop_width(2)?;
                frame.set_local(identifier, Value::Long);
            }
            FStore(identifier) => {
                frame.pop_width(1)?;
                frame.set_local(identifier, Value::Float);
            }
            DStore(identifier) => {
                frame.pop_width(2)?;
                frame.set_local(identifier, Value::Double);
            }
            AStore(identifier) => {
                let value = frame.pop_width(1)?;
                frame.set_local(identifier, value);
            }
            IInc(identifier, _) => frame.set_local(identifier, Value::Int),

            Pop => {
                frame.pop_width(1)?;
            }
            Pop2 => {
                if frame.pop()?.width() == 1 {
                    frame.pop_width(1)?;
                }
            }
            Dup => {
                let value = frame.pop_width(1)?;
                frame.push(value.clone());
                frame.push(value);
            }
            Swap => {
                let first = frame.pop_width(1)?;
                let second = frame.pop_width(1)?;
                frame.push(first);
                frame.push(second);
            }

            IAdd | ISub | IMul => {
                frame.pop_width(1)?;
                frame.pop_width(1)?;
                frame.push(Value::Int);
            }
            LAdd | LSub | LMul => {
                frame.pop_width(2)?;
                frame.pop_width(2)?;
                frame.push(Value::Long);
            }
            FAdd => {
                frame.pop_width(1)?;
                frame.pop_width(1)?;
                frame.push(Value::Float);
            }
            DAdd => {
                frame.pop_width(2)?;
                frame.pop_width(2)?;
                frame.push(Value::Double);
            }
            I2L | I2F | I2D => {
                frame.pop_width(1)?;
                frame.push(match instruction {
                    I2L => Value::Long,
                    I2F => Value::Float,
                    _ => Value::Double,
                });
            }
            L2I => {
                frame.pop_width(2)?;
                frame.push(Value::Int);
            }

            New(class) => frame.push(Value::Uninitialized(class.clone())),
            NewArray(element_type) => {
                frame.pop_width(1)?;
                let array = RefType::array(FieldType::Base(*element_type));
                frame.push(Value::Object(array));
            }
            ANewArray(element_type) => {
                frame.pop_width(1)?;
                let array = RefType::array(FieldType::Ref(element_type.clone()));
                frame.push(Value::Object(array));
            }
            ArrayLength => {
                frame.pop_width(1)?;
                frame.push(Value::Int);
            }
            AALoad => {
                frame.pop_width(1)?;
                let array = frame.pop_width(1)?;
                let element = match array.reference_type().and_then(|t| t.element_type()) {
                    Some(FieldType::Ref(element_type)) => Value::Object(element_type),
                    _ => Value::Top,
                };
                frame.push(element);
            }
            AAStore => {
                frame.pop_width(1)?;
                frame.pop_width(1)?;
                frame.pop_width(1)?;
            }
            CheckCast(ref_type) => {
                frame.pop_width(1)?;
                frame.push(Value::Object(ref_type.clone()));
            }
            InstanceOf(_) => {
                frame.pop_width(1)?;
                frame.push(Value::Int);
            }

            GetStatic(field) => frame.push(Value::from(&field.descriptor)),
            PutStatic(field) => {
                frame.pop_width(field.descriptor.width())?;
            }
            GetField(field) => {
                frame.pop_width(1)?;
                frame.push(Value::from(&field.descriptor));
            }
            PutField(field) => {
                frame.pop_width(field.descriptor.width())?;
                frame.pop_width(1)?;
            }
            Invoke(invoke_type, method) => Self::invoke(*invoke_type, method, frame)?,

            If(_, _) | IfNull(_, _) | IReturn | FReturn | AReturn | AThrow | MonitorEnter
            | MonitorExit => {
                frame.pop_width(1)?;
            }
            IfICmp(_, _) | IfACmp(_, _) => {
                frame.pop_width(1)?;
                frame.pop_width(1)?;
            }
            LReturn | DReturn => {
                frame.pop_width(2)?;
            }

            Expression(expression) => {
                let expander = self
                    .expander
                    .ok_or_else(|| AnalysisErrorKind::UnexpandedExpression(expression.clone()))?;
                let expanded = expander
                    .expand(unit, expression)
                    .map_err(AnalysisErrorKind::Expansion)?;
                log::trace!(
                    "Expanded '{}' into {} instructions",
                    expression,
                    expanded.len()
                );
                for expanded_instruction in &expanded {
                    self.execute(unit, expanded_instruction, frame)?;
                }
            }
        }

        Ok(())
    }

    fn invoke(
        invoke_type: InvokeType,
        method: &MethodRef,
        frame: &mut Frame,
    ) -> Result<(), AnalysisErrorKind> {
        for parameter in method.descriptor.parameters.iter().rev() {
            frame.pop_width(parameter.width())?;
        }

        if invoke_type != InvokeType::Static {
            let receiver = frame.pop_width(1)?;

            // Calling a constructor initializes every copy of the receiver
            if invoke_type == InvokeType::Special && method.name == UnqualifiedName::INIT {
                let initialized = match &receiver {
                    Value::Uninitialized(class) | Value::UninitializedThis(class) => {
                        Some(class.clone())
                    }
                    _ => None,
                };
                if let Some(class) = initialized {
                    frame.replace_all(&receiver, &Value::Object(RefType::Object(class)));
                }
            }
        }

        if let Some(return_type) = &method.descriptor.return_type {
            frame.push(Value::from(return_type));
        }
        Ok(())
    }
}

impl FrameAnalyzer for Analyzer<'_> {
    fn analyze(&self, unit: &Unit) -> Result<Analysis, AnalysisError> {
        let instructions = &unit.code.instructions;

        let mut labels: HashMap<&str, usize> = HashMap::new();
        for (index, instruction) in instructions.iter().enumerate() {
            if let Instruction::Label(label) = instruction {
                if labels.insert(label.as_str(), index).is_some() {
                    let kind = AnalysisErrorKind::DuplicateLabel(label.clone());
                    return Err(AnalysisError::new(index, kind));
                }
            }
        }

        let mut entry_frames: Vec<Option<Frame>> = vec![None; instructions.len()];
        let mut frames: Vec<Option<Frame>> = vec![None; instructions.len()];
        if instructions.is_empty() {
            return Ok(Analysis::new(frames));
        }

        entry_frames[0] = Some(Self::entry_frame(unit));
        let mut worklist: Vec<usize> = vec![0];
        let mut queued: Vec<bool> = vec![false; instructions.len()];
        queued[0] = true;

        while let Some(index) = worklist.pop() {
            queued[index] = false;
            let mut frame = match &entry_frames[index] {
                Some(entry_frame) => entry_frame.clone(),
                None => continue,
            };

            let instruction = &instructions[index];
            log::trace!(
                "Simulating {} ({}) with stack {:?}",
                Element::Instruction(index),
                instruction.mnemonic(),
                frame.stack()
            );
            self.execute(unit, instruction, &mut frame)
                .map_err(|kind| AnalysisError::new(index, kind))?;

            let successors = Self::successors(unit, index, &labels)
                .map_err(|kind| AnalysisError::new(index, kind))?;
            for successor in successors {
                let changed = match &mut entry_frames[successor] {
                    Some(existing) => existing
                        .merge(&frame, self.inheritance)
                        .map_err(|kind| AnalysisError::new(successor, kind))?,
                    empty => {
                        *empty = Some(frame.clone());
                        true
                    }
                };
                if changed && !queued[successor] {
                    queued[successor] = true;
                    worklist.push(successor);
                }
            }

            frames[index] = Some(frame);
        }

        log::debug!(
            "Analyzed {} instructions ({} reachable)",
            instructions.len(),
            frames.iter().filter(|frame| frame.is_some()).count()
        );
        Ok(Analysis::new(frames))
    }
}
