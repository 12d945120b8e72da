use crate::jvm::model::{Field, Method};
use crate::jvm::{BinaryName, ClassAccessFlags};

/// Semantic representation of a class or interface
#[derive(Clone, Debug)]
pub struct Unit {
    pub name: BinaryName,
    pub access_flags: ClassAccessFlags,

    /// Superclass (only `java/lang/Object` has none)
    pub superclass: Option<BinaryName>,

    /// Interfaces directly implemented
    pub interfaces: Vec<BinaryName>,

    pub fields: Vec<Field>,

    /// Methods, in declaration order (the verifier refers to them by index)
    pub methods: Vec<Method>,
}

impl Unit {
    /// Create a new unit without any members
    pub fn new(
        name: BinaryName,
        access_flags: ClassAccessFlags,
        superclass: Option<BinaryName>,
    ) -> Unit {
        Unit {
            name,
            access_flags,
            superclass,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        }
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }
}
