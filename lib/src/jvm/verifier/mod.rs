//! Data-flow verification of method bodies
//!
//! For any specific instruction inside a method body, the stack and locals should have the same
//! structure, regardless of which control flow was used to reach that instruction. In other words:
//! although the values on the stack and in the locals may obviously be different, the types and
//! order of the stack and local variables cannot. This information is referred to as the _frame_
//! at that instruction (represented using [`Frame`]).
//!
//! Knowing the frame before an instruction makes it possible to check that the instruction makes
//! sense (eg. `dadd` only makes sense if the top two elements on the stack are of type `double`)
//! and to compute the frame after it (see [`Frame::apply`]). The "types" used in verification
//! (represented using [`VerificationType`]) are slightly augmented to take into account
//! initialization and `null`.
//!
//! Unlike class files with a `StackMapTable`, the units verified here carry no frames at jump
//! targets. Those get inferred instead: frames are propagated along the edges of the
//! [`ControlFlowGraph`] and merged at join points until nothing changes (see [`engine::run`]).
//! This is [verification by type inference][0].
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.10.2

mod cfg;
mod effects;
pub mod engine;
mod errors;
mod frame;
mod types;

pub use cfg::*;
pub use effects::*;
pub use engine::{entry_frame, FixpointSummary};
pub use errors::*;
pub use frame::*;
pub use types::*;
