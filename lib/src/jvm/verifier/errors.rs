use super::VerificationType;
use crate::jvm::RefType;
use crate::util::Offset;
use std::fmt::{Display, Error as FmtError, Formatter};

/// Ways in which a method body can fail data-flow verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierErrorKind {
    /// Popping from an empty operand stack
    StackUnderflow,

    /// Pushing past the declared maximum stack depth (in words)
    StackOverflow { max_stack: usize },

    /// Two control flow paths reach the same instruction with different stack shapes
    StackHeightConflict {
        current: Vec<VerificationType>,
        incoming: Vec<VerificationType>,
    },

    /// Local variable slot does not hold a value of the kind being accessed
    SlotTypeMismatch {
        slot: u16,
        expected: String,
        found: VerificationType,
    },

    /// Local variable access outside of `max_locals`
    IllegalLocalAccess { slot: u16, max_locals: usize },

    /// Value on the stack is not of the type the instruction requires
    TypeConstraintViolation {
        expected: String,
        found: VerificationType,
    },

    /// Object used before its constructor has run
    UninitializedUse(VerificationType),

    /// Jump (or exception handler) to an offset which is not the start of an instruction
    InvalidTarget(Offset),

    /// The type oracle gave contradictory answers while merging two reference types
    OracleConflict(RefType, RefType),

    /// Verification was abandoned before reaching a verdict
    Cancelled,
}

impl VerifierErrorKind {
    /// Type violation, mentioning the expected type by name
    pub fn type_violation(expected: impl Display, found: VerificationType) -> VerifierErrorKind {
        VerifierErrorKind::TypeConstraintViolation {
            expected: expected.to_string(),
            found,
        }
    }
}

fn write_types(f: &mut Formatter<'_>, types: &[VerificationType]) -> Result<(), FmtError> {
    f.write_str("[")?;
    for (i, typ) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", typ)?;
    }
    f.write_str("]")
}

impl Display for VerifierErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            VerifierErrorKind::StackUnderflow => f.write_str("operand stack underflow"),
            VerifierErrorKind::StackOverflow { max_stack } => {
                write!(f, "operand stack overflow (max_stack is {})", max_stack)
            }
            VerifierErrorKind::StackHeightConflict { current, incoming } => {
                f.write_str("incompatible stack shapes at join: ")?;
                write_types(f, current)?;
                f.write_str(" versus ")?;
                write_types(f, incoming)
            }
            VerifierErrorKind::SlotTypeMismatch {
                slot,
                expected,
                found,
            } => write!(
                f,
                "local {} holds {} but {} was expected",
                slot, found, expected
            ),
            VerifierErrorKind::IllegalLocalAccess { slot, max_locals } => write!(
                f,
                "local {} is out of bounds (max_locals is {})",
                slot, max_locals
            ),
            VerifierErrorKind::TypeConstraintViolation { expected, found } => {
                write!(f, "expected {} but found {}", expected, found)
            }
            VerifierErrorKind::UninitializedUse(found) => {
                write!(f, "use of uninitialized object {}", found)
            }
            VerifierErrorKind::InvalidTarget(target) => {
                write!(f, "offset {} is not the start of an instruction", target)
            }
            VerifierErrorKind::OracleConflict(ref1, ref2) => write!(
                f,
                "inconsistent common supertype for {} and {}",
                ref1, ref2
            ),
            VerifierErrorKind::Cancelled => f.write_str("verification was cancelled"),
        }
    }
}

/// Verification failure at a specific instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierError {
    /// Offset of the instruction (or join point) where the failure was found
    pub offset: Offset,

    /// Rendering of the instruction at that offset
    pub instruction: String,

    pub kind: VerifierErrorKind,
}

impl Display for VerifierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "offset {} ({}): {}",
            self.offset, self.instruction, self.kind
        )
    }
}

impl std::error::Error for VerifierError {}
