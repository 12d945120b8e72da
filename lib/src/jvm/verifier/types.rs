use crate::jvm::class_graph::{is_array_type_assignable, TypeOracle};
use crate::jvm::{ArrayType, BaseType, BinaryName, FieldType, RefType};
use crate::util::{Offset, Width};
use std::fmt::{Display, Error as FmtError, Formatter};

/// These types are from [this hierarchy][0], extended with a bottom element ([`Self::Unset`])
/// and an explicit unusable element ([`Self::Top`])
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.10.1.2
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum VerificationType {
    /// Nothing is known yet (identity for [`Self::merge`])
    Unset,

    /// Unusable value (eg. a local which has never been written, or the second half of a wide
    /// value in the locals)
    Top,

    Integer,
    Float,
    Long,
    Double,
    Null,

    /// In the constructor, the `this` parameter starts with this type then turns into an object
    /// type after `<init>` is called
    UninitializedThis,

    /// State of an object after `new` has been called but `<init>` has not been called
    Uninitialized(UninitializedRefType),

    /// Class, interface, or array type
    Object(RefType),
}

/// Object created by a `new` instruction which has not yet been initialized
///
/// Two objects created by the same `new` are indistinguishable to the verifier, which is why
/// executing a `new` while its previous result is still on the stack is rejected.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct UninitializedRefType {
    /// Once the type is initialized, what will it be?
    pub class: BinaryName,

    /// Offset of the `new` instruction from the start of the method body
    pub offset: Offset,
}

/// Why two verification types could not be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeConflict {
    /// The types belong to different kinds (eg. `int` and `float`)
    Incompatible,

    /// The type oracle named a common supertype that is not a supertype of both classes
    Oracle(RefType, RefType),
}

impl VerificationType {
    /// Class or interface type
    pub const fn class(name: BinaryName) -> VerificationType {
        VerificationType::Object(RefType::Object(name))
    }

    /// Is this type is a reference type?
    pub fn is_reference(&self) -> bool {
        match self {
            VerificationType::Unset
            | VerificationType::Top
            | VerificationType::Integer
            | VerificationType::Float
            | VerificationType::Double
            | VerificationType::Long => false,

            VerificationType::Null
            | VerificationType::UninitializedThis
            | VerificationType::Object(_)
            | VerificationType::Uninitialized(_) => true,
        }
    }

    /// Is this an object whose constructor has not run yet?
    pub fn is_uninitialized(&self) -> bool {
        matches!(
            self,
            VerificationType::UninitializedThis | VerificationType::Uninitialized(_)
        )
    }

    /// Least upper bound of two types
    ///
    /// Class types are merged by asking the oracle for their closest common superclass. This is
    /// commutative and idempotent, and [`Self::Unset`] is the identity.
    pub fn merge<O: TypeOracle + ?Sized>(
        &self,
        other: &VerificationType,
        oracle: &O,
    ) -> Result<VerificationType, MergeConflict> {
        use VerificationType::*;
        match (self, other) {
            (t1, t2) if t1 == t2 => Ok(t1.clone()),
            (Unset, t) | (t, Unset) => Ok(t.clone()),
            (Top, _) | (_, Top) => Ok(Top),
            (Null, Object(ref_type)) | (Object(ref_type), Null) => Ok(Object(ref_type.clone())),
            (Object(ref1), Object(ref2)) => merge_ref_types(ref1, ref2, oracle).map(Object),
            _ => Err(MergeConflict::Incompatible),
        }
    }

    /// Check if one verification type is assignable to another
    ///
    /// This is the `isAssignable` relation from the JVM verifier: `null` is assignable to every
    /// reference type, and everything is assignable to [`Self::Top`]. Uninitialized objects are
    /// only assignable to themselves.
    pub fn is_assignable<O: TypeOracle + ?Sized>(
        sub_type: &VerificationType,
        super_type: &VerificationType,
        oracle: &O,
    ) -> bool {
        use VerificationType::*;
        match (sub_type, super_type) {
            (t1, t2) if t1 == t2 => true,
            (Unset, _) => false,
            (_, Top) => true,
            (Null, Object(_)) => true,
            (Object(t1), Object(t2)) => oracle.is_assignable(t1, t2),
            _ => false,
        }
    }
}

/// Merge two reference types
fn merge_ref_types<O: TypeOracle + ?Sized>(
    ref1: &RefType,
    ref2: &RefType,
    oracle: &O,
) -> Result<RefType, MergeConflict> {
    match (ref1, ref2) {
        (RefType::Object(cls1), RefType::Object(cls2)) => {
            merge_classes(cls1, cls2, oracle).map(RefType::Object)
        }

        // Arrays only have a handful of supertypes
        (RefType::Object(cls), _) | (_, RefType::Object(cls)) => {
            if is_array_type_assignable(cls) {
                Ok(RefType::Object(cls.clone()))
            } else {
                Ok(RefType::Object(BinaryName::OBJECT))
            }
        }

        (RefType::ObjectArray(arr1), RefType::ObjectArray(arr2))
            if arr1.additional_dimensions == arr2.additional_dimensions =>
        {
            match merge_classes(&arr1.element_type, &arr2.element_type, oracle) {
                Ok(element_type) => Ok(RefType::ObjectArray(ArrayType {
                    additional_dimensions: arr1.additional_dimensions,
                    element_type,
                })),
                Err(_) => Err(MergeConflict::Oracle(ref1.clone(), ref2.clone())),
            }
        }

        // Deepest array of `java/lang/Object` which both arrays are subtypes of
        _ => match object_depth(ref1).min(object_depth(ref2)) {
            0 => Ok(RefType::Object(BinaryName::OBJECT)),
            depth => Ok(RefType::ObjectArray(ArrayType {
                additional_dimensions: depth - 1,
                element_type: BinaryName::OBJECT,
            })),
        },
    }
}

/// Number of leading array dimensions whose components are still references
///
/// `[[I` is an array of objects (`[I`), so its depth is 1. `[[Ljava/lang/String;` has depth 2.
fn object_depth(ref_type: &RefType) -> usize {
    match ref_type {
        RefType::Object(_) => 0,
        RefType::ObjectArray(arr) => arr.additional_dimensions + 1,
        RefType::PrimitiveArray(arr) => arr.additional_dimensions,
    }
}

fn merge_classes<O: TypeOracle + ?Sized>(
    cls1: &BinaryName,
    cls2: &BinaryName,
    oracle: &O,
) -> Result<BinaryName, MergeConflict> {
    if oracle.is_subtype(cls1, cls2) {
        Ok(cls2.clone())
    } else if oracle.is_subtype(cls2, cls1) {
        Ok(cls1.clone())
    } else {
        // Classes outside the known hierarchy still share `java/lang/Object`
        match oracle.common_supertype(cls1, cls2) {
            None => Ok(BinaryName::OBJECT),
            Some(common)
                if oracle.is_subtype(cls1, &common) && oracle.is_subtype(cls2, &common) =>
            {
                Ok(common)
            }
            Some(_) => Err(MergeConflict::Oracle(
                RefType::Object(cls1.clone()),
                RefType::Object(cls2.clone()),
            )),
        }
    }
}

impl From<FieldType> for VerificationType {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Base(BaseType::Int)
            | FieldType::Base(BaseType::Char)
            | FieldType::Base(BaseType::Short)
            | FieldType::Base(BaseType::Byte)
            | FieldType::Base(BaseType::Boolean) => VerificationType::Integer,
            FieldType::Base(BaseType::Float) => VerificationType::Float,
            FieldType::Base(BaseType::Long) => VerificationType::Long,
            FieldType::Base(BaseType::Double) => VerificationType::Double,
            FieldType::Ref(ref_type) => VerificationType::Object(ref_type),
        }
    }
}

impl From<&FieldType> for VerificationType {
    fn from(field_type: &FieldType) -> Self {
        VerificationType::from(field_type.clone())
    }
}

impl Width for VerificationType {
    fn width(&self) -> usize {
        match self {
            VerificationType::Double | VerificationType::Long => 2,
            _ => 1,
        }
    }
}

impl Display for VerificationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            VerificationType::Unset => f.write_str("unset"),
            VerificationType::Top => f.write_str("top"),
            VerificationType::Integer => f.write_str("int"),
            VerificationType::Float => f.write_str("float"),
            VerificationType::Long => f.write_str("long"),
            VerificationType::Double => f.write_str("double"),
            VerificationType::Null => f.write_str("null"),
            VerificationType::UninitializedThis => f.write_str("uninitializedThis"),
            VerificationType::Uninitialized(uninit) => {
                write!(f, "uninitialized({}@{})", uninit.class, uninit.offset)
            }
            VerificationType::Object(RefType::Object(cls)) => write!(f, "{}", cls),
            VerificationType::Object(ref_type) => ref_type.fmt(f),
        }
    }
}
