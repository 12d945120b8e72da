use crate::jvm::verifier::{VerifierError, VerifierErrorKind};
use crate::jvm::{BinaryName, ListingError};
use crate::util::Offset;
use std::fmt::{Display, Error as FmtError, Formatter};

/// Reason a pass rejected a unit or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unit is not in the repository
    MissingUnit(BinaryName),

    /// Unit listing could not be parsed
    Listing(ListingError),

    /// Unit or method body is malformed
    Structure(String),

    /// Declarations are inconsistent with themselves or with the class hierarchy
    Declaration(String),

    /// Instruction breaks a static constraint
    CodeConstraint { offset: Offset, message: String },

    /// Data-flow analysis failed
    Verifier(VerifierError),

    /// Method index is out of range for the unit
    NoSuchMethod(usize),
}

impl Error {
    /// Did the pass give up because verification was cancelled?
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Error::Verifier(VerifierError {
                kind: VerifierErrorKind::Cancelled,
                ..
            })
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Error::MissingUnit(name) => write!(f, "unit {} could not be found", name),
            Error::Listing(err) => write!(f, "listing could not be read: {}", err),
            Error::Structure(message) | Error::Declaration(message) => f.write_str(message),
            Error::CodeConstraint { offset, message } => {
                write!(f, "instruction at offset {}: {}", offset, message)
            }
            Error::Verifier(err) => write!(f, "{}", err),
            Error::NoSuchMethod(index) => write!(f, "there is no method with index {}", index),
        }
    }
}

impl std::error::Error for Error {}

impl From<ListingError> for Error {
    fn from(err: ListingError) -> Error {
        Error::Listing(err)
    }
}

impl From<VerifierError> for Error {
    fn from(err: VerifierError) -> Error {
        Error::Verifier(err)
    }
}
