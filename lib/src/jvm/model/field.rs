use crate::jvm::{FieldAccessFlags, FieldType, UnqualifiedName};

/// Declaration of a field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: UnqualifiedName,
    pub descriptor: FieldType,
    pub access_flags: FieldAccessFlags,
}
