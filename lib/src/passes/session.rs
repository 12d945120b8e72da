use super::{Environment, UnitVerifier};
use crate::jvm::BinaryName;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of the unit verifiers of one verification run
///
/// Verifiers are created on first request and live until they are released, so that every
/// caller asking about the same unit shares the same cached results.
pub struct Session<'a> {
    env: Environment<'a>,
    verifiers: Mutex<HashMap<BinaryName, Arc<UnitVerifier<'a>>>>,
}

impl<'a> Session<'a> {
    pub fn new(env: Environment<'a>) -> Session<'a> {
        Session {
            env,
            verifiers: Mutex::new(HashMap::new()),
        }
    }

    /// Verifier for a unit, creating it if this is the first request for the unit
    pub fn verifier(&self, name: &BinaryName) -> Arc<UnitVerifier<'a>> {
        let mut verifiers = self
            .verifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        verifiers
            .entry(name.clone())
            .or_insert_with(|| {
                log::debug!("new verifier for {}", name);
                Arc::new(UnitVerifier::new(name.clone(), self.env))
            })
            .clone()
    }

    /// Flush and forget the verifier of a unit, returning whether there was one
    pub fn release(&self, name: &BinaryName) -> bool {
        let released = self
            .verifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        match released {
            Some(verifier) => {
                verifier.flush();
                true
            }
            None => false,
        }
    }

    /// Names of the units with a live verifier, sorted
    pub fn verifiers(&self) -> Vec<BinaryName> {
        let mut names: Vec<BinaryName> = self
            .verifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Flush the cached results of every live verifier
    pub fn flush_all(&self) {
        let verifiers: Vec<Arc<UnitVerifier<'a>>> = self
            .verifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for verifier in verifiers {
            verifier.flush();
        }
    }
}
