//! Parsed representation of a method being assembled
//!
//! The textual parser produces these. Local variables are referred to by name everywhere in this
//! representation - turning names into slots is the job of
//! [`crate::assemble::variables::VariableTable`].

use crate::jvm::{
    BaseType, BinaryName, FieldType, MethodAccessFlags, MethodDescriptor, Name, RefType,
    UnqualifiedName,
};
use std::fmt;

/// Reference to the part of a [`Unit`] that something (a variable usage, an error) came from
///
/// These are plain indices: elements are owned by the unit, never by the things pointing at them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    /// The method definition itself (eg. the implicit `this` receiver)
    Definition,

    /// Parameter, by its position in the declared parameter list
    Parameter(usize),

    /// Instruction, by its index in [`Code::instructions`]
    Instruction(usize),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Definition => f.write_str("method definition"),
            Element::Parameter(idx) => write!(f, "parameter #{}", idx),
            Element::Instruction(idx) => write!(f, "instruction #{}", idx),
        }
    }
}

/// Method being assembled, along with the class that declares it
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    /// Class declaring the method (the type of `this`)
    pub owner: BinaryName,
    pub definition: MethodDefinition,
    pub code: Code,
}

impl Unit {
    pub fn new(owner: BinaryName, definition: MethodDefinition, code: Code) -> Unit {
        Unit {
            owner,
            definition,
            code,
        }
    }
}

/// Header of a method: modifiers, name, parameters, and return type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDefinition {
    pub name: String,
    pub access_flags: MethodAccessFlags,
    pub parameters: Vec<MethodParameter>,
    pub return_type: Option<FieldType>,
}

impl MethodDefinition {
    pub fn new(
        name: impl Into<String>,
        access_flags: MethodAccessFlags,
        parameters: Vec<MethodParameter>,
        return_type: Option<FieldType>,
    ) -> MethodDefinition {
        MethodDefinition {
            name: name.into(),
            access_flags,
            parameters,
            return_type,
        }
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.is_static()
    }

    /// Constructors start with an uninitialized `this`
    pub fn is_constructor(&self) -> bool {
        self.name == UnqualifiedName::INIT.as_str()
    }
}

/// Named method parameter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodParameter {
    pub name: String,
    pub descriptor: FieldType,
}

impl MethodParameter {
    pub fn new(name: impl Into<String>, descriptor: FieldType) -> MethodParameter {
        MethodParameter {
            name: name.into(),
            descriptor,
        }
    }
}

/// Body of a method
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Code {
    pub instructions: Vec<Instruction>,
}

impl Code {
    pub fn new(instructions: Vec<Instruction>) -> Code {
        Code { instructions }
    }

    /// Instructions which access a local variable, with their index
    pub fn variable_references(&self) -> impl Iterator<Item = (usize, VariableReference<'_>)> {
        self.instructions
            .iter()
            .enumerate()
            .filter_map(|(idx, insn)| insn.variable_reference().map(|var_ref| (idx, var_ref)))
    }
}

/// Constant loaded with `ldc`
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Class(RefType),
}

/// Field referenced by a field access instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRef {
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: FieldType,
}

/// Method referenced by an invoke instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRef {
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor,
}

/// Type of method to invoke
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum InvokeType {
    Virtual,
    Special,
    Static,
    Interface,
}

/// Binary comparison operators available for `int` branches
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum OrdComparison {
    EQ,
    GE,
    GT,
    LE,
    LT,
    NE,
}

/// Equality/inequality comparison operators
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum EqComparison {
    EQ,
    NE,
}

/// Instruction in a method body
///
/// Local variables and jump targets are symbolic. Constant pushing instructions are collapsed
/// (`IConst` covers `iconst_<n>`, `bipush`, and `sipush`), and `wide` never shows up.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// Position in the code which jumps can target
    Label(String),

    Nop,
    AConstNull,
    IConst(i32),
    LConst(i64),
    FConst(f32),
    DConst(f64),
    Ldc(Constant),

    ILoad(String),
    LLoad(String),
    FLoad(String),
    DLoad(String),
    ALoad(String),
    IStore(String),
    LStore(String),
    FStore(String),
    DStore(String),
    AStore(String),
    IInc(String, i16),

    Pop,
    Pop2,
    Dup,
    Swap,

    IAdd,
    ISub,
    IMul,
    LAdd,
    LSub,
    LMul,
    FAdd,
    DAdd,
    I2L,
    I2F,
    I2D,
    L2I,

    New(BinaryName),
    NewArray(BaseType),
    ANewArray(RefType),
    ArrayLength,
    AALoad,
    AAStore,
    CheckCast(RefType),
    InstanceOf(RefType),

    GetStatic(FieldRef),
    PutStatic(FieldRef),
    GetField(FieldRef),
    PutField(FieldRef),
    Invoke(InvokeType, MethodRef),

    If(OrdComparison, String),
    IfICmp(OrdComparison, String),
    IfACmp(EqComparison, String),
    IfNull(EqComparison, String),
    Goto(String),

    IReturn,
    LReturn,
    FReturn,
    DReturn,
    AReturn,
    Return,
    AThrow,
    MonitorEnter,
    MonitorExit,

    /// Inline helper expression, expanded into instructions by an
    /// [`crate::assemble::analysis::ExpressionExpander`]
    Expression(String),
}

/// How an instruction touches a local variable
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VariableOperation {
    /// Value is stored into the variable (eg. `istore`)
    Assign,

    /// Value is read, modified, and written back (eg. `iinc`)
    Update,

    /// Value is read from the variable (eg. `iload`)
    Read,
}

impl fmt::Display for VariableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VariableOperation::Assign => "assign",
            VariableOperation::Update => "update",
            VariableOperation::Read => "read",
        })
    }
}

/// View of an instruction that accesses a local variable
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableReference<'a> {
    pub identifier: &'a str,

    /// Type implied by the opcode (all reference loads/stores imply `java/lang/Object`)
    pub descriptor: FieldType,
    pub operation: VariableOperation,
    pub opcode: &'static str,
}

impl Instruction {
    /// If the instruction accesses a local variable, details of that access
    pub fn variable_reference(&self) -> Option<VariableReference<'_>> {
        use Instruction::*;
        use VariableOperation::*;

        let (identifier, descriptor, operation) = match self {
            ILoad(id) => (id, FieldType::INT, Read),
            LLoad(id) => (id, FieldType::LONG, Read),
            FLoad(id) => (id, FieldType::FLOAT, Read),
            DLoad(id) => (id, FieldType::DOUBLE, Read),
            ALoad(id) => (id, FieldType::OBJECT, Read),
            IStore(id) => (id, FieldType::INT, Assign),
            LStore(id) => (id, FieldType::LONG, Assign),
            FStore(id) => (id, FieldType::FLOAT, Assign),
            DStore(id) => (id, FieldType::DOUBLE, Assign),
            AStore(id) => (id, FieldType::OBJECT, Assign),
            IInc(id, _) => (id, FieldType::INT, Update),
            _ => return None,
        };
        Some(VariableReference {
            identifier: identifier.as_str(),
            descriptor,
            operation,
            opcode: self.mnemonic(),
        })
    }

    /// Jump target label, if any
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            Instruction::If(_, lbl)
            | Instruction::IfICmp(_, lbl)
            | Instruction::IfACmp(_, lbl)
            | Instruction::IfNull(_, lbl)
            | Instruction::Goto(lbl) => Some(lbl),
            _ => None,
        }
    }

    /// Can execution continue on to the next instruction?
    pub fn falls_through(&self) -> bool {
        !matches!(
            self,
            Instruction::Goto(_)
                | Instruction::IReturn
                | Instruction::LReturn
                | Instruction::FReturn
                | Instruction::DReturn
                | Instruction::AReturn
                | Instruction::Return
                | Instruction::AThrow
        )
    }

    /// Opcode name, as it would be written in assembler source
    pub fn mnemonic(&self) -> &'static str {
        use Instruction::*;

        match self {
            Label(_) => "label",
            Nop => "nop",
            AConstNull => "aconst_null",
            IConst(_) => "iconst",
            LConst(_) => "lconst",
            FConst(_) => "fconst",
            DConst(_) => "dconst",
            Ldc(_) => "ldc",
            ILoad(_) => "iload",
            LLoad(_) => "lload",
            FLoad(_) => "fload",
            DLoad(_) => "dload",
            ALoad(_) => "aload",
            IStore(_) => "istore",
            LStore(_) => "lstore",
            FStore(_) => "fstore",
            DStore(_) => "dstore",
            AStore(_) => "astore",
            IInc(_, _) => "iinc",
            Pop => "pop",
            Pop2 => "pop2",
            Dup => "dup",
            Swap => "swap",
            IAdd => "iadd",
            ISub => "isub",
            IMul => "imul",
            LAdd => "ladd",
            LSub => "lsub",
            LMul => "lmul",
            FAdd => "fadd",
            DAdd => "dadd",
            I2L => "i2l",
            I2F => "i2f",
            I2D => "i2d",
            L2I => "l2i",
            New(_) => "new",
            NewArray(_) => "newarray",
            ANewArray(_) => "anewarray",
            ArrayLength => "arraylength",
            AALoad => "aaload",
            AAStore => "aastore",
            CheckCast(_) => "checkcast",
            InstanceOf(_) => "instanceof",
            GetStatic(_) => "getstatic",
            PutStatic(_) => "putstatic",
            GetField(_) => "getfield",
            PutField(_) => "putfield",
            Invoke(InvokeType::Virtual, _) => "invokevirtual",
            Invoke(InvokeType::Special, _) => "invokespecial",
            Invoke(InvokeType::Static, _) => "invokestatic",
            Invoke(InvokeType::Interface, _) => "invokeinterface",
            If(_, _) => "if",
            IfICmp(_, _) => "if_icmp",
            IfACmp(_, _) => "if_acmp",
            IfNull(EqComparison::EQ, _) => "ifnull",
            IfNull(EqComparison::NE, _) => "ifnonnull",
            Goto(_) => "goto",
            IReturn => "ireturn",
            LReturn => "lreturn",
            FReturn => "freturn",
            DReturn => "dreturn",
            AReturn => "areturn",
            Return => "return",
            AThrow => "athrow",
            MonitorEnter => "monitorenter",
            MonitorExit => "monitorexit",
            Expression(_) => "expr",
        }
    }
}
