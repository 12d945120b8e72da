//! Verification passes over units
//!
//! A unit is verified in four passes, each of which only runs once the pass it depends on has
//! succeeded:
//!
//!   - __Pass 1__ ([`Pass::Structure`]) checks that the unit could be loaded at all and that its
//!     members and method bodies are well-formed containers
//!   - __Pass 2__ ([`Pass::Statics`]) checks declarations against the rest of the class hierarchy
//!   - __Pass 3a__ ([`Pass::CodeConstraints`]) checks each method body instruction by instruction,
//!     without looking at control flow
//!   - __Pass 3b__ ([`Pass::DataFlow`]) infers frames for each method body and checks that every
//!     instruction is used with operands of the right types
//!
//! Results are cached per unit in a [`UnitVerifier`], and unit verifiers are handed out by a
//! [`Session`].

mod code_constraints;
mod data_flow;
mod errors;
mod session;
mod statics;
mod structure;
mod unit_verifier;

pub use errors::Error;
pub use session::Session;
pub use unit_verifier::*;

use crate::jvm::class_graph::TypeOracle;
use crate::jvm::model::{Repository, Unit};
use crate::jvm::BinaryName;
use crate::settings::Settings;
use std::fmt::{Display, Error as FmtError, Formatter};
use std::sync::atomic::AtomicBool;

/// Verification pass
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Pass {
    Structure,
    Statics,
    CodeConstraints,
    DataFlow,
}

impl Pass {
    /// Pass which must succeed before this one can run
    ///
    /// For per-method passes, the prerequisite is for the same method.
    pub fn prerequisite(self) -> Option<Pass> {
        match self {
            Pass::Structure => None,
            Pass::Statics => Some(Pass::Structure),
            Pass::CodeConstraints => Some(Pass::Statics),
            Pass::DataFlow => Some(Pass::CodeConstraints),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pass::Structure => "Pass 1",
            Pass::Statics => "Pass 2",
            Pass::CodeConstraints => "Pass 3a",
            Pass::DataFlow => "Pass 3b",
        }
    }

    /// Does the pass run separately for every method?
    pub fn is_per_method(self) -> bool {
        matches!(self, Pass::CodeConstraints | Pass::DataFlow)
    }

    /// Run the pass (ignoring its prerequisite), returning warnings on success
    ///
    /// `method` is ignored by passes which are not per-method.
    fn run(self, env: &Environment, name: &BinaryName, method: usize) -> Result<Vec<String>, Error> {
        match self {
            Pass::Structure => structure::verify_structure(env, name),
            Pass::Statics => statics::verify_declarations(env, env.unit(name)?),
            Pass::CodeConstraints => {
                code_constraints::verify_code_constraints(env, env.unit(name)?, method)
            }
            Pass::DataFlow => data_flow::verify_data_flow(env, env.unit(name)?, method),
        }
    }
}

/// Read-only context shared by all verification of a session
#[derive(Copy, Clone)]
pub struct Environment<'a> {
    /// Units which can be verified
    pub repository: &'a Repository,

    /// Class hierarchy used for subtyping questions
    pub oracle: &'a dyn TypeOracle,

    pub settings: &'a Settings,

    /// When set, running data-flow analyses give up at their next iteration
    pub cancellation: Option<&'a AtomicBool>,
}

impl<'a> Environment<'a> {
    pub fn new(
        repository: &'a Repository,
        oracle: &'a dyn TypeOracle,
        settings: &'a Settings,
    ) -> Environment<'a> {
        Environment {
            repository,
            oracle,
            settings,
            cancellation: None,
        }
    }

    pub fn with_cancellation(self, flag: &'a AtomicBool) -> Environment<'a> {
        Environment {
            cancellation: Some(flag),
            ..self
        }
    }

    /// Successfully loaded unit
    fn unit(&self, name: &BinaryName) -> Result<&'a Unit, Error> {
        match self.repository.lookup(name) {
            None => Err(Error::MissingUnit(name.clone())),
            Some(Err(err)) => Err(Error::Listing(err.clone())),
            Some(Ok(unit)) => Ok(unit),
        }
    }
}

/// Outcome of a pass
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    Ok,
    Failed,

    /// A prerequisite pass did not succeed
    NotRun,

    /// Verification was abandoned (never cached)
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub status: VerificationStatus,

    /// Explanation for anything other than [`VerificationStatus::Ok`]
    pub message: String,
}

impl VerificationResult {
    pub fn ok() -> VerificationResult {
        VerificationResult {
            status: VerificationStatus::Ok,
            message: String::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> VerificationResult {
        VerificationResult {
            status: VerificationStatus::Failed,
            message: message.into(),
        }
    }

    pub fn not_run(message: impl Into<String>) -> VerificationResult {
        VerificationResult {
            status: VerificationStatus::NotRun,
            message: message.into(),
        }
    }

    pub fn cancelled() -> VerificationResult {
        VerificationResult {
            status: VerificationStatus::Cancelled,
            message: String::from("verification was cancelled"),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == VerificationStatus::Ok
    }
}

impl Display for VerificationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self.status {
            VerificationStatus::Ok => f.write_str("VERIFIED_OK"),
            VerificationStatus::Failed => write!(f, "VERIFIED_REJECTED: {}", self.message),
            VerificationStatus::NotRun => write!(f, "VERIFIED_NOTYET: {}", self.message),
            VerificationStatus::Cancelled => write!(f, "CANCELLED: {}", self.message),
        }
    }
}

/// Cached outcome of a pass, along with the warnings it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassRecord {
    pub result: VerificationResult,
    pub messages: Vec<String>,
}
