use super::{Environment, Error};
use crate::jvm::model::{Method, Unit};
use crate::jvm::{
    visibility_count, AccessKeywords, BinaryName, ClassAccessFlags, FieldAccessFlags,
    MethodAccessFlags, UnqualifiedName,
};

/// Highest number of parameter slots a method can take (including `this`)
const MAX_PARAMETER_SLOTS: usize = 255;

/// Check the declarations of a unit against themselves and the class hierarchy
pub fn verify_declarations(env: &Environment, unit: &Unit) -> Result<Vec<String>, Error> {
    let declaration = |message: String| Err(Error::Declaration(message));
    let oracle = env.oracle;

    // Superclass
    match &unit.superclass {
        None if unit.name != BinaryName::OBJECT => {
            return declaration(format!("{} has no superclass", unit.name));
        }
        None => (),
        Some(_) if unit.name == BinaryName::OBJECT => {
            return declaration(format!("{} cannot have a superclass", unit.name));
        }
        Some(superclass) => match oracle.class_flags(superclass) {
            None => return declaration(format!("superclass {} is not known", superclass)),
            Some(flags) if flags.contains(ClassAccessFlags::INTERFACE) => {
                return declaration(format!("superclass {} is an interface", superclass));
            }
            Some(flags) if flags.contains(ClassAccessFlags::FINAL) => {
                return declaration(format!("superclass {} is final", superclass));
            }
            Some(_) => (),
        },
    }

    // Interfaces
    for interface in &unit.interfaces {
        match oracle.class_flags(interface) {
            None => return declaration(format!("interface {} is not known", interface)),
            Some(flags) if !flags.contains(ClassAccessFlags::INTERFACE) => {
                return declaration(format!("{} is implemented but is not an interface", interface));
            }
            Some(_) => (),
        }
    }

    // Class flags
    let flags = unit.access_flags;
    if flags.contains(ClassAccessFlags::ABSTRACT | ClassAccessFlags::FINAL) {
        return declaration(String::from("class cannot be both abstract and final"));
    }
    if unit.is_interface() {
        if !flags.contains(ClassAccessFlags::ABSTRACT) {
            return declaration(String::from("interface must be abstract"));
        }
        if unit.superclass.as_ref() != Some(&BinaryName::OBJECT) {
            return declaration(String::from("interface must extend java/lang/Object"));
        }
    }

    for field in &unit.fields {
        if visibility_count(field.access_flags.bits()) > 1 {
            return declaration(format!(
                "field {} has more than one of public, private, and protected",
                field.name
            ));
        }
        if field
            .access_flags
            .contains(FieldAccessFlags::FINAL | FieldAccessFlags::VOLATILE)
        {
            return declaration(format!("field {} cannot be final and volatile", field.name));
        }
    }

    for (index, method) in unit.methods.iter().enumerate() {
        check_method_declaration(method).map_err(|message| {
            Error::Declaration(format!(
                "method {} ('{}'): {}",
                index,
                method.signature(),
                message
            ))
        })?;
    }

    Ok(vec![])
}

fn check_method_declaration(method: &Method) -> Result<(), String> {
    let flags = method.access_flags;

    if visibility_count(flags.bits()) > 1 {
        return Err(String::from(
            "more than one of public, private, and protected",
        ));
    }

    if flags.contains(MethodAccessFlags::ABSTRACT) {
        let forbidden = MethodAccessFlags::PRIVATE
            | MethodAccessFlags::STATIC
            | MethodAccessFlags::FINAL
            | MethodAccessFlags::SYNCHRONIZED
            | MethodAccessFlags::NATIVE;
        if flags.intersects(forbidden) {
            return Err(format!(
                "abstract method cannot also be {}",
                (flags & forbidden).keywords()
            ));
        }
    }

    if method.name == UnqualifiedName::INIT {
        if method.is_static() {
            return Err(String::from("instance initializer cannot be static"));
        }
        if method.descriptor.return_type.is_some() {
            return Err(String::from("instance initializer must return void"));
        }
    } else if method.name == UnqualifiedName::CLINIT {
        let takes_nothing = method.descriptor.parameters.is_empty();
        if !method.is_static() || !takes_nothing || method.descriptor.return_type.is_some() {
            return Err(String::from("class initializer must be static and take no arguments"));
        }
    }

    let parameter_slots = method.descriptor.parameter_slots(!method.is_static());
    if parameter_slots > MAX_PARAMETER_SLOTS {
        return Err(format!(
            "takes {} parameter slots (at most {} are allowed)",
            parameter_slots, MAX_PARAMETER_SLOTS
        ));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::ClassGraph;
    use crate::jvm::model::{Field, Repository};
    use crate::jvm::{FieldType, MethodDescriptor, Name, ParseDescriptor};
    use crate::settings::Settings;

    fn check(unit: &Unit, graph: &ClassGraph) -> Result<Vec<String>, Error> {
        let repository = Repository::new();
        let settings = Settings::new();
        let env = Environment::new(&repository, graph, &settings);
        verify_declarations(&env, unit)
    }

    fn name(name: &str) -> BinaryName {
        BinaryName::from_str(name).unwrap()
    }

    fn method(name: &str, descriptor: &str, access_flags: MethodAccessFlags) -> Method {
        Method {
            name: UnqualifiedName::from_str(name).unwrap(),
            descriptor: MethodDescriptor::parse(descriptor).unwrap(),
            access_flags,
            code: None,
        }
    }

    #[test]
    fn superclasses() {
        let graph = ClassGraph::with_java_library_types();

        let unit = Unit::new(name("demo/A"), ClassAccessFlags::PUBLIC, Some(BinaryName::EXCEPTION));
        assert_eq!(check(&unit, &graph), Ok(vec![]));

        let unit = Unit::new(name("demo/A"), ClassAccessFlags::PUBLIC, Some(BinaryName::STRING));
        assert_eq!(
            check(&unit, &graph),
            Err(Error::Declaration(String::from("superclass java/lang/String is final")))
        );

        let unit = Unit::new(name("demo/A"), ClassAccessFlags::PUBLIC, Some(BinaryName::CHARSEQUENCE));
        assert!(check(&unit, &graph).is_err());

        let unit = Unit::new(name("demo/A"), ClassAccessFlags::PUBLIC, Some(name("demo/Missing")));
        assert!(check(&unit, &graph).is_err());

        let unit = Unit::new(name("demo/A"), ClassAccessFlags::PUBLIC, None);
        assert!(check(&unit, &graph).is_err());

        let object = Unit::new(BinaryName::OBJECT, ClassAccessFlags::PUBLIC, None);
        assert_eq!(check(&object, &graph), Ok(vec![]));
    }

    #[test]
    fn interfaces() {
        let graph = ClassGraph::with_java_library_types();

        let mut unit = Unit::new(name("demo/A"), ClassAccessFlags::PUBLIC, Some(BinaryName::OBJECT));
        unit.interfaces.push(BinaryName::COMPARABLE);
        assert_eq!(check(&unit, &graph), Ok(vec![]));

        unit.interfaces.push(BinaryName::NUMBER);
        assert!(check(&unit, &graph).is_err());

        let iface_flags = ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT;
        let iface = Unit::new(name("demo/I"), iface_flags, Some(BinaryName::OBJECT));
        assert_eq!(check(&iface, &graph), Ok(vec![]));

        let not_abstract = Unit::new(name("demo/I"), ClassAccessFlags::INTERFACE, Some(BinaryName::OBJECT));
        assert!(check(&not_abstract, &graph).is_err());

        let extends = Unit::new(name("demo/I"), iface_flags, Some(BinaryName::NUMBER));
        assert!(check(&extends, &graph).is_err());
    }

    #[test]
    fn members() {
        let graph = ClassGraph::with_java_library_types();
        let mut unit = Unit::new(name("demo/A"), ClassAccessFlags::PUBLIC, Some(BinaryName::OBJECT));

        unit.fields.push(Field {
            name: UnqualifiedName::from_str("x").unwrap(),
            descriptor: FieldType::int(),
            access_flags: FieldAccessFlags::PUBLIC | FieldAccessFlags::PRIVATE,
        });
        assert!(check(&unit, &graph).is_err());
        unit.fields.clear();

        unit.methods.push(method("<init>", "()V", MethodAccessFlags::PUBLIC));
        unit.methods.push(method("<clinit>", "()V", MethodAccessFlags::STATIC));
        unit.methods.push(method("run", "(JJ)V", MethodAccessFlags::ABSTRACT));
        assert_eq!(check(&unit, &graph), Ok(vec![]));

        unit.methods.push(method(
            "run",
            "()V",
            MethodAccessFlags::ABSTRACT | MethodAccessFlags::STATIC,
        ));
        assert_eq!(
            check(&unit, &graph),
            Err(Error::Declaration(String::from(
                "method 3 ('static abstract run()V'): abstract method cannot also be static"
            )))
        );
        unit.methods.pop();

        unit.methods.push(method("<init>", "()I", MethodAccessFlags::PUBLIC));
        assert!(check(&unit, &graph).is_err());
        unit.methods.pop();

        unit.methods.push(method("<clinit>", "(I)V", MethodAccessFlags::STATIC));
        assert!(check(&unit, &graph).is_err());
        unit.methods.pop();

        let many_longs = format!("({})V", "J".repeat(128));
        unit.methods.push(method("wide", &many_longs, MethodAccessFlags::STATIC));
        assert!(check(&unit, &graph).is_err());
    }
}
