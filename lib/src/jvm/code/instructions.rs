//! Decoded JVM instructions
//!
//! The representation is slightly different from the usual presentation to make it more
//! convenient to verify:
//!
//!   - The "wide" instruction doesn't show up at all, but instead gets merged into the
//!     instructions it is allowed to modify (so local indices are always `u16`)
//!
//!   - Some instructions (like the branches) get abstracted into one instruction with a field.
//!     This helps with repetitive pattern matches.
//!
//!   - Constant pool indices are already resolved into symbolic operands (class names, member
//!     references, and constant values)
//!
//!   - `jsr` and `ret` are omitted: subroutines are not supported
//!

use crate::jvm::{BaseType, BinaryName, FieldType, MethodDescriptor, RefType, UnqualifiedName};
use crate::util::Offset;
use std::fmt::{Debug, Error as FmtError, Formatter};

/// Non-branching JVM bytecode instruction
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Nop,
    AConstNull,
    IConstM1,
    IConst0,
    IConst1,
    IConst2,
    IConst3,
    IConst4,
    IConst5,
    LConst0,
    LConst1,
    FConst0,
    FConst1,
    FConst2,
    DConst0,
    DConst1,
    BiPush(i8),
    SiPush(i16),
    Ldc(ConstantData), // covers both `ldc` and `ldc_w`
    Ldc2(ConstantData),
    ILoad(u16), // covers `iload`, `iload{0,3}`, and `wide iload`
    LLoad(u16),
    FLoad(u16),
    DLoad(u16),
    ALoad(u16),
    IALoad,
    LALoad,
    FALoad,
    DALoad,
    AALoad,
    BALoad,
    CALoad,
    SALoad,
    IStore(u16), // covers `istore`, `istore{0,3}`, and `wide istore`
    LStore(u16),
    FStore(u16),
    DStore(u16),
    AStore(u16),
    IAStore,
    LAStore,
    FAStore,
    DAStore,
    AAStore,
    BAStore,
    CAStore,
    SAStore,
    Pop,
    Pop2,
    Dup,
    DupX1,
    DupX2,
    Dup2,
    Dup2X1,
    Dup2X2,
    Swap,
    IAdd,
    LAdd,
    FAdd,
    DAdd,
    ISub,
    LSub,
    FSub,
    DSub,
    IMul,
    LMul,
    FMul,
    DMul,
    IDiv,
    LDiv,
    FDiv,
    DDiv,
    IRem,
    LRem,
    FRem,
    DRem,
    INeg,
    LNeg,
    FNeg,
    DNeg,
    ISh(ShiftType), // covers `ishr`, `ishl`, and `iushr`
    LSh(ShiftType), // covers `lshr`, `lshl`, and `lushr`
    IAnd,
    LAnd,
    IOr,
    LOr,
    IXor,
    LXor,
    IInc(u16, i16), // covers `iinc` and `wide iinc`
    I2L,
    I2F,
    I2D,
    L2I,
    L2F,
    L2D,
    F2I,
    F2L,
    F2D,
    D2I,
    D2L,
    D2F,
    I2B,
    I2C,
    I2S,
    LCmp,
    FCmp(CompareMode), // covers `fcmpl` and `fcmpg`
    DCmp(CompareMode), // covers `dcmpl` and `dcmpg`
    GetStatic(FieldRef),
    PutStatic(FieldRef),
    GetField(FieldRef),
    PutField(FieldRef),
    Invoke(InvokeType, MethodRef),
    InvokeDynamic(InvokeDynamicRef),
    New(RefType),
    NewArray(BaseType),
    ANewArray(RefType),
    MultiANewArray(RefType, u8),
    ArrayLength,
    CheckCast(RefType),
    InstanceOf(RefType),
    MonitorEnter,
    MonitorExit,
}

impl Instruction {
    /// Local variable slot read or written by the instruction, along with the width of the value
    pub fn local_access(&self) -> Option<(u16, usize)> {
        use Instruction::*;
        match self {
            ILoad(idx) | FLoad(idx) | ALoad(idx) | IStore(idx) | FStore(idx) | AStore(idx)
            | IInc(idx, _) => Some((*idx, 1)),
            LLoad(idx) | DLoad(idx) | LStore(idx) | DStore(idx) => Some((*idx, 2)),
            _ => None,
        }
    }
}

/// Branch instruction (any instruction which can do something other than fall through to the
/// next instruction)
///
/// Jump targets are absolute offsets into the code array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchInstruction {
    If(OrdComparison, Offset), // covers `ifeq`, `ifne`, `iflt`, `ifge`, `ifgt`, `ifle`
    IfICmp(OrdComparison, Offset), // covers `if_icmpeq`, `if_icmpne`, `if_icmplt`, ... `if_icmple`
    IfACmp(EqComparison, Offset), // covers `if_acmpeq`, `if_acmpne`
    IfNull(EqComparison, Offset), // covers `ifnull`, `ifnonnull`
    Goto(Offset),                 // covers `goto` and `goto_w`
    TableSwitch {
        /// Jump target if the argument is less than `low` or greater than
        /// `low + targets.len()`
        default: Offset,

        /// Value associated with the first jump target
        low: i32,

        /// Jump targets
        targets: Vec<Offset>,
    },
    LookupSwitch {
        /// Jump target if there is no corresponding key
        default: Offset,

        /// Jump targets (sorted so that the keys are ascending)
        targets: Vec<(i32, Offset)>,
    },
    IReturn,
    LReturn,
    FReturn,
    DReturn,
    AReturn,
    Return,
    AThrow,
}

impl BranchInstruction {
    /// Can the instruction fall through to the next instruction?
    pub fn falls_through(&self) -> bool {
        match self {
            BranchInstruction::If(_, _)
            | BranchInstruction::IfICmp(_, _)
            | BranchInstruction::IfACmp(_, _)
            | BranchInstruction::IfNull(_, _) => true,

            BranchInstruction::Goto(_)
            | BranchInstruction::TableSwitch { .. }
            | BranchInstruction::LookupSwitch { .. }
            | BranchInstruction::IReturn
            | BranchInstruction::LReturn
            | BranchInstruction::FReturn
            | BranchInstruction::DReturn
            | BranchInstruction::AReturn
            | BranchInstruction::Return
            | BranchInstruction::AThrow => false,
        }
    }

    /// Non-fallthrough jump targets, in operand order (switch defaults come first)
    pub fn jump_targets(&self) -> Vec<Offset> {
        match self {
            BranchInstruction::If(_, target)
            | BranchInstruction::IfICmp(_, target)
            | BranchInstruction::IfACmp(_, target)
            | BranchInstruction::IfNull(_, target)
            | BranchInstruction::Goto(target) => vec![*target],
            BranchInstruction::TableSwitch {
                default, targets, ..
            } => {
                let mut ts = vec![*default];
                ts.extend(targets.iter().copied());
                ts
            }
            BranchInstruction::LookupSwitch { default, targets } => {
                let mut ts = vec![*default];
                ts.extend(targets.iter().map(|(_, target)| *target));
                ts
            }
            BranchInstruction::IReturn
            | BranchInstruction::LReturn
            | BranchInstruction::FReturn
            | BranchInstruction::DReturn
            | BranchInstruction::AReturn
            | BranchInstruction::Return
            | BranchInstruction::AThrow => vec![],
        }
    }
}

/// Any instruction in a method body
#[derive(Clone, PartialEq)]
pub enum Insn {
    Regular(Instruction),
    Branch(BranchInstruction),
}

impl Insn {
    /// Can the instruction fall through to the next instruction?
    pub fn falls_through(&self) -> bool {
        match self {
            Insn::Regular(_) => true,
            Insn::Branch(branch) => branch.falls_through(),
        }
    }

    /// Non-fallthrough jump targets
    pub fn jump_targets(&self) -> Vec<Offset> {
        match self {
            Insn::Regular(_) => vec![],
            Insn::Branch(branch) => branch.jump_targets(),
        }
    }
}

impl From<Instruction> for Insn {
    fn from(insn: Instruction) -> Insn {
        Insn::Regular(insn)
    }
}

impl From<BranchInstruction> for Insn {
    fn from(insn: BranchInstruction) -> Insn {
        Insn::Branch(insn)
    }
}

impl Debug for Insn {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Insn::Regular(insn) => insn.fmt(f),
            Insn::Branch(insn) => insn.fmt(f),
        }
    }
}

/// Loadable constant, as referenced by `ldc` and `ldc2_w`
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantData {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
    Class(RefType),
    MethodType(MethodDescriptor),
}

/// Symbolic reference to a field
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub class: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: FieldType,
}

/// Symbolic reference to a method
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub class: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor,
}

/// Call site of an `invokedynamic`
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InvokeDynamicRef {
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor,
}

impl Debug for FieldRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}.{} {}", self.class, self.name, self.descriptor)
    }
}

impl Debug for MethodRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}.{}{}", self.class, self.name, self.descriptor)
    }
}

impl Debug for InvokeDynamicRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// Possible bit shifts
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ShiftType {
    Left,
    LogicalRight,
    ArithmeticRight,
}

/// Comparison modes for floating point
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CompareMode {
    /// -1 on NaN
    L,

    /// 1 on NaN
    G,
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

/// Type of method to invoke
///
/// Note: `InvokeDynamic` is kept separate because it has no receiver class.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum InvokeType {
    Virtual,
    Special,
    Static,
    Interface(u8), // `count` is of total arguments, where `long`/`double` count for 2
}
