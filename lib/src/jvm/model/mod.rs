//! Semantic representations of the units being verified
//!
//! This is the already-decoded form of a class (or interface) the verifier works on. Nothing here
//! knows about constant pools: every reference to a type or member is symbolic.
//!
//!   - __Class__ (or interface) is represented using [`Unit`]
//!   - __Method__ is represented using [`Method`] (with its body in [`Code`])
//!   - __Field__ is represented using [`Field`]
//!
//! Units are looked up by name in a [`Repository`].

mod class;
mod field;
mod method;
mod repository;

pub use crate::jvm::code::{Code, ExceptionHandler};
pub use class::*;
pub use field::*;
pub use method::*;
pub use repository::*;
