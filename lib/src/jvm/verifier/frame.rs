use super::{MergeConflict, VerificationType, VerifierErrorKind};
use crate::jvm::class_graph::TypeOracle;
use crate::jvm::BinaryName;
use crate::util::{OffsetVec, Width};
use std::fmt::{Display, Error as FmtError, Formatter};

/// Snapshot of the stack and local variables at a point in the bytecode
///
/// Locals are one entry per slot: a `long` or `double` in slot `n` is followed by [`Top`] in slot
/// `n + 1`. The stack is an [`OffsetVec`], so wide values are a single entry taking two words of
/// the `max_stack` budget.
///
/// [`Top`]: VerificationType::Top
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Frame {
    /// Local variables (exactly `max_locals` slots)
    pub locals: Vec<VerificationType>,

    /// Types of values on the stack
    pub stack: OffsetVec<VerificationType>,

    /// Maximum depth of the stack, in words
    pub max_stack: usize,

    /// Set while the superclass constructor has not yet run on some path reaching this point
    pub this_uninitialized: bool,
}

/// Kind of access to a local variable (from the instruction doing the load)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LocalKind {
    Int,
    Float,
    Long,
    Double,
    Reference,
}

impl LocalKind {
    pub fn width(self) -> usize {
        match self {
            LocalKind::Long | LocalKind::Double => 2,
            _ => 1,
        }
    }

    fn accepts(self, vtype: &VerificationType) -> bool {
        match self {
            LocalKind::Int => vtype == &VerificationType::Integer,
            LocalKind::Float => vtype == &VerificationType::Float,
            LocalKind::Long => vtype == &VerificationType::Long,
            LocalKind::Double => vtype == &VerificationType::Double,
            LocalKind::Reference => vtype.is_reference(),
        }
    }
}

impl Display for LocalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(match self {
            LocalKind::Int => "int",
            LocalKind::Float => "float",
            LocalKind::Long => "long",
            LocalKind::Double => "double",
            LocalKind::Reference => "reference",
        })
    }
}

impl Frame {
    /// Frame with an empty stack and all locals unusable
    pub fn new(max_locals: usize, max_stack: usize) -> Frame {
        Frame {
            locals: vec![VerificationType::Top; max_locals],
            stack: OffsetVec::new(),
            max_stack,
            this_uninitialized: false,
        }
    }

    pub fn max_locals(&self) -> usize {
        self.locals.len()
    }

    /// Push a value onto the stack
    pub fn push(&mut self, vtype: VerificationType) -> Result<(), VerifierErrorKind> {
        if self.stack.offset_len().0 + vtype.width() > self.max_stack {
            return Err(VerifierErrorKind::StackOverflow {
                max_stack: self.max_stack,
            });
        }
        self.stack.push(vtype);
        Ok(())
    }

    /// Pop a value off the stack
    pub fn pop(&mut self) -> Result<VerificationType, VerifierErrorKind> {
        self.stack
            .pop()
            .map(|(_, _, typ)| typ)
            .ok_or(VerifierErrorKind::StackUnderflow)
    }

    /// Pop a value of a given width (category) off the stack
    pub fn pop_expecting_width(
        &mut self,
        expected_width: usize,
    ) -> Result<VerificationType, VerifierErrorKind> {
        let typ = self.pop()?;
        if typ.width() == expected_width {
            Ok(typ)
        } else {
            let expected = format!("a category {} value", expected_width);
            Err(VerifierErrorKind::type_violation(expected, typ))
        }
    }

    /// Pop a value which must be assignable to the expected type
    pub fn pop_expecting_type<O: TypeOracle + ?Sized>(
        &mut self,
        expected: &VerificationType,
        oracle: &O,
    ) -> Result<VerificationType, VerifierErrorKind> {
        let typ = self.pop()?;
        check_assignable(&typ, expected, oracle)?;
        Ok(typ)
    }

    fn check_local_bounds(&self, slot: u16, width: usize) -> Result<(), VerifierErrorKind> {
        if slot as usize + width > self.locals.len() {
            Err(VerifierErrorKind::IllegalLocalAccess {
                slot,
                max_locals: self.locals.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Read a local variable
    pub fn load(&self, slot: u16, kind: LocalKind) -> Result<VerificationType, VerifierErrorKind> {
        self.check_local_bounds(slot, kind.width())?;
        let found = &self.locals[slot as usize];
        let second_half_ok = kind.width() == 1
            || self.locals[slot as usize + 1] == VerificationType::Top;
        if kind.accepts(found) && second_half_ok {
            Ok(found.clone())
        } else {
            Err(VerifierErrorKind::SlotTypeMismatch {
                slot,
                expected: kind.to_string(),
                found: found.clone(),
            })
        }
    }

    /// Write a local variable
    ///
    /// Writing into either half of an existing wide value invalidates the other half.
    pub fn store(&mut self, slot: u16, vtype: VerificationType) -> Result<(), VerifierErrorKind> {
        let width = vtype.width();
        self.check_local_bounds(slot, width)?;
        let slot = slot as usize;

        // Overwriting the second half of a wide value
        if slot > 0 && self.locals[slot - 1].width() == 2 {
            self.locals[slot - 1] = VerificationType::Top;
        }

        // Overwriting the first half of a wide value with something narrow
        if width == 1 && self.locals[slot].width() == 2 && slot + 1 < self.locals.len() {
            self.locals[slot + 1] = VerificationType::Top;
        }

        self.locals[slot] = vtype;
        if width == 2 {
            // The wide value itself may have split a wide value starting in its second slot
            if self.locals[slot + 1].width() == 2 && slot + 2 < self.locals.len() {
                self.locals[slot + 2] = VerificationType::Top;
            }
            self.locals[slot + 1] = VerificationType::Top;
        }
        Ok(())
    }

    /// Replace every occurrence of one type (in both the stack and locals) with another
    pub fn replace_all(&mut self, original: &VerificationType, updated: &VerificationType) {
        self.stack.update_all(|typ| {
            if typ == original {
                *typ = updated.clone();
            }
        });
        for typ in &mut self.locals {
            if typ == original {
                *typ = updated.clone();
            }
        }
    }

    /// Does the stack or the locals contain a type?
    pub fn contains(&self, vtype: &VerificationType) -> bool {
        self.stack.iter().any(|(_, _, typ)| typ == vtype) || self.locals.contains(vtype)
    }

    /// Merge the frame with the frame arriving from another control flow path
    ///
    /// Stacks must have the same shape. Locals that do not agree become unusable, as do
    /// single-word stack entries that do not agree.
    pub fn merge<O: TypeOracle + ?Sized>(
        &self,
        incoming: &Frame,
        oracle: &O,
    ) -> Result<Frame, VerifierErrorKind> {
        let height_conflict = || VerifierErrorKind::StackHeightConflict {
            current: self.stack.iter().map(|(_, _, t)| t.clone()).collect(),
            incoming: incoming.stack.iter().map(|(_, _, t)| t.clone()).collect(),
        };

        if !self.stack.same_shape(&incoming.stack) || self.locals.len() != incoming.locals.len() {
            return Err(height_conflict());
        }

        let mut locals = Vec::with_capacity(self.locals.len());
        for (t1, t2) in self.locals.iter().zip(incoming.locals.iter()) {
            locals.push(match t1.merge(t2, oracle) {
                Ok(merged) => merged,
                Err(MergeConflict::Incompatible) => VerificationType::Top,
                Err(MergeConflict::Oracle(r1, r2)) => {
                    return Err(VerifierErrorKind::OracleConflict(r1, r2))
                }
            });
        }

        let mut stack = OffsetVec::new();
        for ((_, _, t1), (_, _, t2)) in self.stack.iter().zip(incoming.stack.iter()) {
            stack.push(match t1.merge(t2, oracle) {
                Ok(merged) => merged,
                Err(MergeConflict::Incompatible) if t1.width() == 1 => VerificationType::Top,
                Err(MergeConflict::Incompatible) => return Err(height_conflict()),
                Err(MergeConflict::Oracle(r1, r2)) => {
                    return Err(VerifierErrorKind::OracleConflict(r1, r2))
                }
            });
        }

        Ok(Frame {
            locals,
            stack,
            max_stack: self.max_stack,
            this_uninitialized: self.this_uninitialized || incoming.this_uninitialized,
        })
    }

    /// Frame on entry to an exception handler protecting an instruction with this incoming frame
    ///
    /// The stack is cleared and the caught exception (`java/lang/Throwable` for catch-all
    /// handlers) is pushed.
    pub fn exception_handler_frame(
        &self,
        catch_type: Option<&BinaryName>,
    ) -> Result<Frame, VerifierErrorKind> {
        let caught = catch_type.cloned().unwrap_or(BinaryName::THROWABLE);
        let mut frame = Frame {
            locals: self.locals.clone(),
            stack: OffsetVec::new(),
            max_stack: self.max_stack,
            this_uninitialized: self.this_uninitialized,
        };
        frame.push(VerificationType::class(caught))?;
        Ok(frame)
    }
}

/// Check that a value can be used where another type is expected
///
/// Uninitialized objects used where an initialized reference is expected are reported as such,
/// everything else is a plain type violation.
pub fn check_assignable<O: TypeOracle + ?Sized>(
    found: &VerificationType,
    expected: &VerificationType,
    oracle: &O,
) -> Result<(), VerifierErrorKind> {
    if VerificationType::is_assignable(found, expected, oracle) {
        Ok(())
    } else if found.is_uninitialized() && expected.is_reference() {
        Err(VerifierErrorKind::UninitializedUse(found.clone()))
    } else {
        Err(VerifierErrorKind::type_violation(expected, found.clone()))
    }
}
