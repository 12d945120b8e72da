//! Class hierarchy queries
//!
//! The verifier never walks a class hierarchy itself. Every question about subtyping goes through
//! the [`TypeOracle`] trait, which is keyed only by [`BinaryName`]. [`ClassGraph`] is the
//! implementation used by the command line tool and the tests: a name-keyed map of class headers
//! (superclass, interfaces, and access flags) which starts out with a handful of `java.*` types
//! and gets extended with every unit loaded from a listing.

use super::model::Unit;
use super::{BinaryName, ClassAccessFlags, RefType};
use std::collections::{HashMap, HashSet};

mod assignable;
mod java_classes;

pub use assignable::*;

/// Read-only view of a class hierarchy
///
/// Implementations must be side-effect free and terminate on every query (even if the hierarchy
/// they describe contains cycles). Unknown classes are never subtypes of anything but themselves
/// and `java/lang/Object`.
pub trait TypeOracle: Sync {
    /// Is the first class or interface a subtype of the second?
    fn is_subtype(&self, sub_type: &BinaryName, super_type: &BinaryName) -> bool;

    /// Closest common superclass of two classes (or `None` if it cannot be determined)
    fn common_supertype(&self, first: &BinaryName, second: &BinaryName) -> Option<BinaryName>;

    /// Access flags of a class (or `None` if the class is not known)
    fn class_flags(&self, name: &BinaryName) -> Option<ClassAccessFlags>;

    /// Is the class known to the oracle?
    fn is_known(&self, name: &BinaryName) -> bool {
        self.class_flags(name).is_some()
    }

    /// Is the class a known interface?
    fn is_interface(&self, name: &BinaryName) -> bool {
        self.class_flags(name)
            .map_or(false, |flags| flags.contains(ClassAccessFlags::INTERFACE))
    }

    /// Is the first reference type assignable to the second?
    ///
    /// This matches the semantics of the prolog predicate `isJavaAssignable(sub_type,
    /// super_type)` from JVMS §4.10.1.2.
    fn is_assignable(&self, sub_type: &RefType, super_type: &RefType) -> bool {
        is_ref_type_assignable(self, sub_type, super_type)
    }
}

/// Header of a class, as far as the class hierarchy is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassData {
    pub name: BinaryName,

    /// Superclass (only `java/lang/Object` has none)
    pub superclass: Option<BinaryName>,

    /// Interfaces directly implemented (or extended, for interfaces)
    pub interfaces: Vec<BinaryName>,

    pub access_flags: ClassAccessFlags,
}

impl ClassData {
    pub fn new(
        name: BinaryName,
        superclass: BinaryName,
        access_flags: ClassAccessFlags,
    ) -> ClassData {
        ClassData {
            name,
            superclass: Some(superclass),
            interfaces: vec![],
            access_flags,
        }
    }

    pub fn implementing(mut self, interfaces: &[BinaryName]) -> ClassData {
        self.interfaces.extend(interfaces.iter().cloned());
        self
    }
}

/// Name-keyed class hierarchy
#[derive(Debug, Default)]
pub struct ClassGraph {
    classes: HashMap<BinaryName, ClassData>,
}

impl ClassGraph {
    /// New empty graph
    pub fn new() -> ClassGraph {
        ClassGraph {
            classes: HashMap::new(),
        }
    }

    /// New graph containing the standard `java.*` types the verifier commonly needs
    pub fn with_java_library_types() -> ClassGraph {
        let mut class_graph = ClassGraph::new();
        class_graph.insert_java_library_types();
        class_graph
    }

    /// Add a class to the graph, returning the header it replaced (if any)
    pub fn add_class(&mut self, class: ClassData) -> Option<ClassData> {
        self.classes.insert(class.name.clone(), class)
    }

    /// Add the header of a loaded unit to the graph
    pub fn add_unit(&mut self, unit: &Unit) -> Option<ClassData> {
        self.add_class(ClassData {
            name: unit.name.clone(),
            superclass: unit.superclass.clone(),
            interfaces: unit.interfaces.clone(),
            access_flags: unit.access_flags,
        })
    }

    pub fn get(&self, name: &BinaryName) -> Option<&ClassData> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The class followed by all of its superclasses, ending in `java/lang/Object`
    ///
    /// Returns `None` if the chain passes through an unknown class or loops back on itself.
    /// Interfaces are treated as having `java/lang/Object` as superclass.
    fn superclass_chain<'a>(&'a self, name: &'a BinaryName) -> Option<Vec<&'a BinaryName>> {
        let mut chain: Vec<&'a BinaryName> = vec![];
        let mut seen: HashSet<&'a BinaryName> = HashSet::new();
        let mut current = name;
        loop {
            if !seen.insert(current) {
                return None;
            }
            chain.push(current);
            let class_data = self.classes.get(current)?;
            match &class_data.superclass {
                Some(superclass) => current = superclass,
                None if current == &BinaryName::OBJECT => return Some(chain),
                None => return None,
            }
        }
    }
}

impl TypeOracle for ClassGraph {
    fn is_subtype(&self, sub_type: &BinaryName, super_type: &BinaryName) -> bool {
        if sub_type == super_type || super_type == &BinaryName::OBJECT {
            return true;
        }

        let mut supertypes_to_visit: Vec<&BinaryName> = vec![sub_type];
        let mut dont_revisit: HashSet<&BinaryName> = HashSet::new();
        dont_revisit.insert(sub_type);

        // Optimization: if the super type is a class, then skip visiting interfaces
        let super_is_class: bool = !self.is_interface(super_type);

        while let Some(next_supertype) = supertypes_to_visit.pop() {
            if next_supertype == super_type {
                return true;
            }
            let class_data = match self.classes.get(next_supertype) {
                Some(class_data) => class_data,
                None => continue,
            };

            if let Some(superclass) = &class_data.superclass {
                if dont_revisit.insert(superclass) {
                    supertypes_to_visit.push(superclass);
                }
            }
            if !super_is_class {
                for interface in &class_data.interfaces {
                    if dont_revisit.insert(interface) {
                        supertypes_to_visit.push(interface);
                    }
                }
            }
        }

        false
    }

    fn common_supertype(&self, first: &BinaryName, second: &BinaryName) -> Option<BinaryName> {
        let first_chain = self.superclass_chain(first)?;
        let second_chain: HashSet<&BinaryName> =
            self.superclass_chain(second)?.into_iter().collect();
        first_chain
            .into_iter()
            .find(|name| second_chain.contains(name))
            .cloned()
    }

    fn class_flags(&self, name: &BinaryName) -> Option<ClassAccessFlags> {
        self.classes.get(name).map(|class| class.access_flags)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::Name;

    fn name(name: &str) -> BinaryName {
        BinaryName::from_str(name).unwrap()
    }

    #[test]
    fn common_supertypes() {
        let class_graph = ClassGraph::with_java_library_types();

        assert_eq!(
            class_graph.common_supertype(&BinaryName::INTEGER, &BinaryName::LONG),
            Some(BinaryName::NUMBER)
        );
        assert_eq!(
            class_graph.common_supertype(&BinaryName::LONG, &BinaryName::INTEGER),
            Some(BinaryName::NUMBER)
        );
        assert_eq!(
            class_graph.common_supertype(&BinaryName::STRING, &BinaryName::INTEGER),
            Some(BinaryName::OBJECT)
        );
        assert_eq!(
            class_graph.common_supertype(
                &BinaryName::ARITHMETICEXCEPTION,
                &BinaryName::NULLPOINTEREXCEPTION
            ),
            Some(BinaryName::RUNTIMEEXCEPTION)
        );
        assert_eq!(
            class_graph.common_supertype(&BinaryName::CHARSEQUENCE, &BinaryName::STRING),
            Some(BinaryName::OBJECT),
            "interfaces only have java/lang/Object as a superclass"
        );
        assert_eq!(
            class_graph.common_supertype(&name("demo/Missing"), &BinaryName::STRING),
            None
        );
    }

    #[test]
    fn units_extend_the_graph() {
        let mut class_graph = ClassGraph::with_java_library_types();
        class_graph.add_class(ClassData::new(
            name("demo/Shape"),
            BinaryName::OBJECT,
            ClassAccessFlags::PUBLIC | ClassAccessFlags::ABSTRACT,
        ));
        class_graph.add_class(
            ClassData::new(name("demo/Circle"), name("demo/Shape"), ClassAccessFlags::PUBLIC)
                .implementing(&[BinaryName::CLONEABLE]),
        );

        assert!(class_graph.is_subtype(&name("demo/Circle"), &name("demo/Shape")));
        assert!(class_graph.is_subtype(&name("demo/Circle"), &BinaryName::CLONEABLE));
        assert!(!class_graph.is_subtype(&name("demo/Shape"), &BinaryName::CLONEABLE));
        assert!(class_graph.is_subtype(&name("demo/Unknown"), &BinaryName::OBJECT));
        assert!(!class_graph.is_subtype(&name("demo/Unknown"), &name("demo/Shape")));
        assert!(class_graph.is_interface(&BinaryName::CLONEABLE));
        assert!(!class_graph.is_interface(&name("demo/Circle")));
    }

    #[test]
    fn cyclic_hierarchy_terminates() {
        let mut class_graph = ClassGraph::with_java_library_types();
        class_graph.add_class(ClassData::new(name("A"), name("B"), ClassAccessFlags::PUBLIC));
        class_graph.add_class(ClassData::new(name("B"), name("A"), ClassAccessFlags::PUBLIC));

        assert!(!class_graph.is_subtype(&name("A"), &BinaryName::STRING));
        assert_eq!(class_graph.common_supertype(&name("A"), &name("B")), None);
    }
}
