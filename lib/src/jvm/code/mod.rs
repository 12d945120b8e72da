//! Method bodies and the instructions in them

mod instructions;

pub use instructions::*;

use super::BinaryName;
use crate::util::Offset;

/// Longest possible code array
pub const MAX_CODE_LENGTH: usize = 65535;

/// Body of a method that is neither `abstract` nor `native`
#[derive(Clone, Debug)]
pub struct Code {
    /// Maximum depth of the operand stack, in words
    pub max_stack: u16,

    /// Number of local variable slots
    pub max_locals: u16,

    /// Length of the code array in bytes
    pub length: usize,

    /// Instructions, sorted by offset
    pub instructions: Vec<(Offset, Insn)>,

    /// Exception handlers, in declaration order
    pub exception_table: Vec<ExceptionHandler>,
}

impl Code {
    /// Find the position of the instruction at an offset (if there is one)
    pub fn instruction_index(&self, offset: Offset) -> Option<usize> {
        self.instructions
            .binary_search_by_key(&offset, |(off, _)| *off)
            .ok()
    }

    /// Is the offset the start of an instruction?
    pub fn is_boundary(&self, offset: Offset) -> bool {
        self.instruction_index(offset).is_some()
    }
}

/// Entry in the exception table of a method
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Start of the protected range (inclusive)
    pub start: Offset,

    /// End of the protected range (exclusive)
    pub end: Offset,

    /// Start of the handler code
    pub handler: Offset,

    /// Class of exceptions caught (`None` catches everything)
    pub catch_type: Option<BinaryName>,
}

impl ExceptionHandler {
    /// Does the handler protect the instruction at this offset?
    pub fn protects(&self, offset: Offset) -> bool {
        self.start <= offset && offset < self.end
    }
}
