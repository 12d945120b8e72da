use crate::jvm::listing::ListingError;
use crate::jvm::model::Unit;
use crate::jvm::BinaryName;
use std::collections::HashMap;

/// Name-keyed store of the units available for verification
///
/// Units whose listing could not be parsed are kept too, so that verifying them reports the parse
/// error instead of a missing unit.
#[derive(Debug, Default)]
pub struct Repository {
    units: HashMap<BinaryName, Result<Unit, ListingError>>,
}

impl Repository {
    pub fn new() -> Repository {
        Repository {
            units: HashMap::new(),
        }
    }

    /// Add a unit, returning the unit it replaced (if any)
    pub fn insert(&mut self, unit: Unit) -> Option<Result<Unit, ListingError>> {
        self.units.insert(unit.name.clone(), Ok(unit))
    }

    /// Record that the listing for a unit failed to load
    pub fn insert_failed(
        &mut self,
        name: BinaryName,
        error: ListingError,
    ) -> Option<Result<Unit, ListingError>> {
        self.units.insert(name, Err(error))
    }

    /// Find a unit by name
    pub fn lookup(&self, name: &BinaryName) -> Option<&Result<Unit, ListingError>> {
        self.units.get(name)
    }

    /// All successfully loaded units
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter_map(|unit| unit.as_ref().ok())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
