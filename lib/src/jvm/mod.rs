//! Model and verify JVM classes
//!
//! ### Simple example
//!
//! Consider a class with a single static method returning a constant:
//!
//! ```java,ignore,no_run
//! public class Answer {
//!     public static int answer() {
//!         return 42;
//!     }
//! }
//! ```
//!
//! The body of that method can be checked by running the data-flow verifier over it directly:
//!
//! ```
//! use classverify::jvm::class_graph::ClassGraph;
//! use classverify::jvm::listing::parse_listing;
//! use classverify::jvm::verifier::{engine, entry_frame, ControlFlowGraph, MethodContext};
//! use classverify::settings::Settings;
//!
//! let unit = parse_listing("
//! class public demo/Answer
//! method public static answer ()I
//!   code stack 1 locals 0
//!     0: bipush 42
//!     2: ireturn
//! end
//! ").unwrap();
//!
//! // Setup the class graph, add in Java standard library types and the new class
//! let mut class_graph = ClassGraph::with_java_library_types();
//! class_graph.add_unit(&unit);
//!
//! // Infer frames for every instruction of the method
//! let method = &unit.methods[0];
//! let code = method.code.as_ref().unwrap();
//! let ctx = MethodContext::new(&unit, method, &class_graph);
//! let cfg = ControlFlowGraph::build(code).unwrap();
//! let entry = entry_frame(&ctx, method, code).unwrap();
//! let summary = engine::run(&cfg, entry, &ctx, &Settings::new(), None).unwrap();
//! assert!(summary.unreachable.is_empty());
//! ```
//!
//! Most callers should go through [`crate::passes`] instead, which also checks the structure and
//! declarations of the unit before running the data-flow analysis.

mod access_flags;
pub mod class_graph;
pub mod code;
mod descriptors;
pub mod listing;
pub mod model;
mod names;
pub mod verifier;

pub use access_flags::*;
pub use descriptors::*;
pub use listing::{parse_listing, ListingError};
pub use names::*;
