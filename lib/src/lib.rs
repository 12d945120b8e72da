//! Structural verification of JVM classes
//!
//! Units (classes and interfaces) are read from textual listings (see [`jvm::listing`]) and
//! checked in several passes (see [`passes`]), the last of which infers the type of every stack
//! slot and local variable at every instruction of every method.

pub mod jvm;
pub mod passes;
pub mod settings;
pub mod util;
