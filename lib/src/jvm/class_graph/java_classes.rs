use super::{ClassData, ClassGraph};
use crate::jvm::{BinaryName, ClassAccessFlags};

const CLASS: ClassAccessFlags = ClassAccessFlags::from_bits_truncate(
    ClassAccessFlags::PUBLIC.bits() | ClassAccessFlags::SUPER.bits(),
);
const FINAL_CLASS: ClassAccessFlags = ClassAccessFlags::from_bits_truncate(
    CLASS.bits() | ClassAccessFlags::FINAL.bits(),
);
const ABSTRACT_CLASS: ClassAccessFlags = ClassAccessFlags::from_bits_truncate(
    CLASS.bits() | ClassAccessFlags::ABSTRACT.bits(),
);
const INTERFACE: ClassAccessFlags = ClassAccessFlags::from_bits_truncate(
    ClassAccessFlags::PUBLIC.bits()
        | ClassAccessFlags::INTERFACE.bits()
        | ClassAccessFlags::ABSTRACT.bits(),
);

impl ClassGraph {
    /// Add the `java.*` types that show up in most class listings
    ///
    /// Only the class headers are recorded (the verifier resolves members from the symbolic
    /// references in the instructions).
    pub fn insert_java_library_types(&mut self) {
        use BinaryName as N;

        self.add_class(ClassData {
            name: N::OBJECT,
            superclass: None,
            interfaces: vec![],
            access_flags: CLASS,
        });

        // Interfaces
        for interface in [N::CHARSEQUENCE, N::CLONEABLE, N::COMPARABLE, N::SERIALIZABLE] {
            self.add_class(ClassData::new(interface, N::OBJECT, INTERFACE));
        }

        // `java.lang`
        self.add_class(
            ClassData::new(N::STRING, N::OBJECT, FINAL_CLASS).implementing(&[
                N::SERIALIZABLE,
                N::COMPARABLE,
                N::CHARSEQUENCE,
            ]),
        );
        self.add_class(
            ClassData::new(N::STRINGBUILDER, N::OBJECT, FINAL_CLASS)
                .implementing(&[N::SERIALIZABLE, N::CHARSEQUENCE]),
        );
        self.add_class(
            ClassData::new(N::CLASS, N::OBJECT, FINAL_CLASS).implementing(&[N::SERIALIZABLE]),
        );
        self.add_class(
            ClassData::new(N::NUMBER, N::OBJECT, ABSTRACT_CLASS).implementing(&[N::SERIALIZABLE]),
        );
        for boxed in [N::INTEGER, N::LONG, N::FLOAT, N::DOUBLE] {
            self.add_class(
                ClassData::new(boxed, N::NUMBER, FINAL_CLASS).implementing(&[N::COMPARABLE]),
            );
        }
        self.add_class(ClassData::new(N::MATH, N::OBJECT, FINAL_CLASS));
        self.add_class(ClassData::new(N::SYSTEM, N::OBJECT, FINAL_CLASS));

        // `java.lang.invoke`
        self.add_class(ClassData::new(N::METHODHANDLE, N::OBJECT, ABSTRACT_CLASS));
        self.add_class(
            ClassData::new(N::METHODTYPE, N::OBJECT, FINAL_CLASS).implementing(&[N::SERIALIZABLE]),
        );

        // Exceptions
        self.add_class(
            ClassData::new(N::THROWABLE, N::OBJECT, CLASS).implementing(&[N::SERIALIZABLE]),
        );
        self.add_class(ClassData::new(N::ERROR, N::THROWABLE, CLASS));
        self.add_class(ClassData::new(N::EXCEPTION, N::THROWABLE, CLASS));
        self.add_class(ClassData::new(N::RUNTIMEEXCEPTION, N::EXCEPTION, CLASS));
        for runtime_exception in [
            N::ARITHMETICEXCEPTION,
            N::ILLEGALARGUMENTEXCEPTION,
            N::ILLEGALSTATEEXCEPTION,
            N::NULLPOINTEREXCEPTION,
        ] {
            self.add_class(ClassData::new(runtime_exception, N::RUNTIMEEXCEPTION, CLASS));
        }
    }
}
