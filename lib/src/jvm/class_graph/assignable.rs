use super::TypeOracle;
use crate::jvm::{BinaryName, RefType};
use std::cmp::Ordering;

/// Reference type assignability, answered through a type oracle
///
/// Assignment to an interface type always succeeds for class types: the JVM verifier leaves
/// interface checks to runtime.
pub fn is_ref_type_assignable<O: TypeOracle + ?Sized>(
    oracle: &O,
    sub_type: &RefType,
    super_type: &RefType,
) -> bool {
    match (sub_type, super_type) {
        // Special superclass and interfaces of all arrays
        (RefType::PrimitiveArray(_) | RefType::ObjectArray(_), RefType::Object(object_type)) => {
            is_array_type_assignable(object_type)
        }

        // Primitive arrays must match in dimension and type
        (RefType::PrimitiveArray(arr1), RefType::PrimitiveArray(arr2)) => arr1 == arr2,

        // Higher dimensional primitive arrays can be subtypes of object arrays
        (RefType::PrimitiveArray(arr1), RefType::ObjectArray(arr2)) => {
            match arr1.additional_dimensions.cmp(&arr2.additional_dimensions) {
                Ordering::Less | Ordering::Equal => false,
                Ordering::Greater => is_array_type_assignable(&arr2.element_type),
            }
        }

        // Cursed (unsound) covariance of arrays
        (RefType::ObjectArray(arr1), RefType::ObjectArray(arr2)) => {
            match arr1.additional_dimensions.cmp(&arr2.additional_dimensions) {
                Ordering::Less => false,
                Ordering::Equal => {
                    is_class_assignable(oracle, &arr1.element_type, &arr2.element_type)
                }
                Ordering::Greater => is_array_type_assignable(&arr2.element_type),
            }
        }

        (RefType::Object(cls1), RefType::Object(cls2)) => is_class_assignable(oracle, cls1, cls2),

        _ => false,
    }
}

fn is_class_assignable<O: TypeOracle + ?Sized>(
    oracle: &O,
    sub_type: &BinaryName,
    super_type: &BinaryName,
) -> bool {
    oracle.is_subtype(sub_type, super_type) || oracle.is_interface(super_type)
}

/// Check if arrays can be assigned to a super type
///
/// This bakes in knowledge of the small, finite set of super types arrays have.
pub fn is_array_type_assignable(super_type: &BinaryName) -> bool {
    super_type == &BinaryName::OBJECT
        || super_type == &BinaryName::CLONEABLE
        || super_type == &BinaryName::SERIALIZABLE
}

#[cfg(test)]
mod test {
    use crate::jvm::class_graph::{ClassGraph, TypeOracle};
    use crate::jvm::{BinaryName, FieldType, RefType};

    fn class(name: BinaryName) -> RefType {
        RefType::Object(name)
    }

    #[test]
    fn simple_classes() {
        let java = ClassGraph::with_java_library_types();

        let object_cls = &class(BinaryName::OBJECT);
        let string_cls = &class(BinaryName::STRING);

        assert!(
            java.is_assignable(object_cls, object_cls),
            "java.lang.Object <: java.lang.Object"
        );
        assert!(
            java.is_assignable(string_cls, object_cls),
            "java.lang.String <: java.lang.Object"
        );
        assert!(
            !java.is_assignable(object_cls, string_cls),
            "java.lang.Object </: java.lang.String"
        );
    }

    #[test]
    fn transitive_classes() {
        let java = ClassGraph::with_java_library_types();

        let object_cls = &class(BinaryName::OBJECT);
        let number_cls = &class(BinaryName::NUMBER);
        let integer_cls = &class(BinaryName::INTEGER);

        assert!(
            java.is_assignable(integer_cls, number_cls),
            "java.lang.Integer <: java.lang.Number"
        );
        assert!(
            java.is_assignable(integer_cls, object_cls),
            "java.lang.Integer <: java.lang.Object"
        );
        assert!(
            !java.is_assignable(number_cls, integer_cls),
            "java.lang.Number </: java.lang.Integer"
        );
    }

    #[test]
    fn interfaces_accept_any_class() {
        let java = ClassGraph::with_java_library_types();

        let object_cls = &class(BinaryName::OBJECT);
        let integer_cls = &class(BinaryName::INTEGER);
        let charsequence_cls = &class(BinaryName::CHARSEQUENCE);

        assert!(
            java.is_subtype(&BinaryName::STRING, &BinaryName::CHARSEQUENCE),
            "java.lang.String implements java.lang.CharSequence"
        );
        assert!(
            !java.is_subtype(&BinaryName::INTEGER, &BinaryName::CHARSEQUENCE),
            "java.lang.Integer does not implement java.lang.CharSequence"
        );
        assert!(
            java.is_assignable(integer_cls, charsequence_cls),
            "interface assignability is left to runtime checks"
        );
        assert!(
            java.is_assignable(charsequence_cls, object_cls),
            "java.lang.CharSequence <: java.lang.Object"
        );
    }

    #[test]
    fn primitive_arrays() {
        let java = ClassGraph::with_java_library_types();

        let object_cls = &class(BinaryName::OBJECT);
        let cloneable_cls = &class(BinaryName::CLONEABLE);
        let int_array = &RefType::array(FieldType::int());
        let long_array = &RefType::array(FieldType::long());

        assert!(java.is_assignable(int_array, object_cls), "[]int <: java.lang.Object");
        assert!(java.is_assignable(long_array, cloneable_cls), "[]long <: java.lang.Cloneable");
        assert!(!java.is_assignable(object_cls, int_array), "java.lang.Object </: []int");
        assert!(java.is_assignable(int_array, int_array), "[]int <: []int");
        assert!(!java.is_assignable(int_array, long_array), "[]int </: []long");
    }

    #[test]
    fn object_arrays() {
        let java = ClassGraph::with_java_library_types();

        let int_array = &RefType::array(FieldType::int());
        let integer_array = &RefType::array(FieldType::object(BinaryName::INTEGER));
        let number_array = &RefType::array(FieldType::object(BinaryName::NUMBER));
        let string_cls = &class(BinaryName::STRING);

        assert!(
            !java.is_assignable(int_array, integer_array),
            "[]int </: []java.lang.Integer"
        );
        assert!(
            java.is_assignable(integer_array, number_array),
            "[]java.lang.Integer <: []java.lang.Number"
        );
        assert!(
            !java.is_assignable(number_array, integer_array),
            "[]java.lang.Number </: []java.lang.Integer"
        );
        assert!(
            !java.is_assignable(integer_array, string_cls),
            "[]java.lang.Integer </: java.lang.String"
        );
    }

    #[test]
    fn nested_arrays() {
        let java = ClassGraph::with_java_library_types();

        let object_array = &RefType::array(FieldType::object(BinaryName::OBJECT));
        let nested_int_array = &RefType::array(FieldType::array(FieldType::int()));
        let nested_integer_array = &RefType::array(FieldType::array(FieldType::object(
            BinaryName::INTEGER,
        )));

        assert!(
            java.is_assignable(nested_int_array, object_array),
            "[][]int <: []java.lang.Object"
        );
        assert!(
            java.is_assignable(nested_integer_array, object_array),
            "[][]java.lang.Integer <: []java.lang.Object"
        );
        assert!(
            !java.is_assignable(object_array, nested_int_array),
            "[]java.lang.Object <!: [][]int"
        );
    }
}
