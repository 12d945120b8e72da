use super::{Environment, Error};
use crate::jvm::code::{Code, Insn, Instruction, InvokeType, MethodRef};
use crate::jvm::model::Unit;
use crate::jvm::{BinaryName, ClassAccessFlags, RefType, UnqualifiedName};
use crate::util::Offset;

/// Most dimensions an array type can have
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Check each instruction of a method body in isolation, along with its exception table
///
/// Nothing here depends on control flow: every check looks at one instruction (or one exception
/// handler) and the declarations of the unit.
pub fn verify_code_constraints(
    env: &Environment,
    unit: &Unit,
    method_index: usize,
) -> Result<Vec<String>, Error> {
    let method = unit
        .methods
        .get(method_index)
        .ok_or(Error::NoSuchMethod(method_index))?;
    let code = match &method.code {
        Some(code) => code,
        None => return Ok(vec![]),
    };

    let parameter_slots = method.descriptor.parameter_slots(!method.is_static());
    if parameter_slots > code.max_locals as usize {
        return Err(Error::CodeConstraint {
            offset: Offset(0),
            message: format!(
                "parameters take {} local slots but max_locals is {}",
                parameter_slots, code.max_locals
            ),
        });
    }

    for (offset, insn) in &code.instructions {
        if let Insn::Regular(insn) = insn {
            check_instruction(env, code, insn).map_err(|message| Error::CodeConstraint {
                offset: *offset,
                message,
            })?;
        }
    }

    check_exception_table(env, code)
}

fn check_instruction(env: &Environment, code: &Code, insn: &Instruction) -> Result<(), String> {
    if let Some((idx, width)) = insn.local_access() {
        if idx as usize + width > code.max_locals as usize {
            return Err(format!(
                "local {} is out of bounds (max_locals is {})",
                idx, code.max_locals
            ));
        }
    }

    match insn {
        Instruction::New(ref_type) => match ref_type {
            RefType::Object(class) => check_instantiable(env, class),
            _ => Err(format!("`new` cannot create the array type {}", ref_type)),
        },
        Instruction::ANewArray(component) => {
            if component.dimensions() + 1 > MAX_ARRAY_DIMENSIONS {
                Err(format!(
                    "array of {} would have more than {} dimensions",
                    component, MAX_ARRAY_DIMENSIONS
                ))
            } else {
                Ok(())
            }
        }
        Instruction::MultiANewArray(array_type, dimensions) => {
            let dimensions = *dimensions as usize;
            if dimensions == 0 {
                Err(String::from("`multianewarray` must create at least one dimension"))
            } else if dimensions > array_type.dimensions() {
                Err(format!(
                    "cannot create {} dimensions of {}",
                    dimensions, array_type
                ))
            } else {
                Ok(())
            }
        }
        Instruction::Invoke(invoke_type, method) => check_invoke(*invoke_type, method),
        Instruction::InvokeDynamic(call_site) => {
            if call_site.name.is_initializer() {
                Err(format!("`invokedynamic` cannot call {}", call_site.name))
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

/// `new` needs a concrete class, as far as the oracle can tell
fn check_instantiable(env: &Environment, class: &BinaryName) -> Result<(), String> {
    match env.oracle.class_flags(class) {
        Some(flags) if flags.contains(ClassAccessFlags::INTERFACE) => {
            Err(format!("`new` cannot instantiate the interface {}", class))
        }
        Some(flags) if flags.contains(ClassAccessFlags::ABSTRACT) => {
            Err(format!("`new` cannot instantiate the abstract class {}", class))
        }
        _ => Ok(()),
    }
}

fn check_invoke(invoke_type: InvokeType, method: &MethodRef) -> Result<(), String> {
    if method.name == UnqualifiedName::CLINIT {
        return Err(String::from("class initializers cannot be invoked"));
    }
    if method.name == UnqualifiedName::INIT {
        if invoke_type != InvokeType::Special {
            return Err(format!(
                "{:?} can only be invoked with `invokespecial`",
                method
            ));
        }
        if method.descriptor.return_type.is_some() {
            return Err(format!("{:?} must return void", method));
        }
    }
    if let InvokeType::Interface(count) = invoke_type {
        let expected = method.descriptor.parameter_slots(true);
        if count as usize != expected {
            return Err(format!(
                "`invokeinterface` count is {} but {:?} takes {} argument slots",
                count, method, expected
            ));
        }
    }
    Ok(())
}

fn check_exception_table(env: &Environment, code: &Code) -> Result<Vec<String>, Error> {
    let mut warnings = vec![];

    for (index, handler) in code.exception_table.iter().enumerate() {
        let at_handler = |message: String| Error::CodeConstraint {
            offset: handler.start,
            message: format!("exception handler {}: {}", index, message),
        };

        if handler.start >= handler.end {
            return Err(at_handler(format!(
                "protected range {}..{} is empty",
                handler.start, handler.end
            )));
        }

        if let Some(catch_type) = &handler.catch_type {
            if !env.oracle.is_known(catch_type) {
                return Err(at_handler(format!("catch type {} is not known", catch_type)));
            }
            if !env.oracle.is_subtype(catch_type, &BinaryName::THROWABLE) {
                return Err(at_handler(format!(
                    "catch type {} is not a subclass of {}",
                    catch_type,
                    BinaryName::THROWABLE
                )));
            }
        }

        let protects_something = code
            .instructions
            .iter()
            .any(|(offset, _)| handler.protects(*offset));
        if !protects_something {
            warnings.push(format!(
                "exception handler {} protects no instruction",
                index
            ));
        }
    }

    Ok(warnings)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::ClassGraph;
    use crate::jvm::model::Repository;
    use crate::jvm::parse_listing;
    use crate::settings::Settings;

    fn check(listing: &str) -> Result<Vec<String>, Error> {
        let unit = parse_listing(listing).unwrap();
        let mut graph = ClassGraph::with_java_library_types();
        graph.add_unit(&unit);
        let repository = Repository::new();
        let settings = Settings::new();
        let env = Environment::new(&repository, &graph, &settings);
        verify_code_constraints(&env, &unit, 0)
    }

    fn single(locals: u16, line: &str) -> Result<Vec<String>, Error> {
        check(&format!(
            "class demo/T\nmethod static m ()V\ncode stack 4 locals {}\n0: {}\n9: return\nend\n",
            locals, line
        ))
    }

    fn message(result: Result<Vec<String>, Error>) -> String {
        match result {
            Err(Error::CodeConstraint { message, .. }) => message,
            other => panic!("expected a code constraint failure, got {:?}", other),
        }
    }

    #[test]
    fn locals() {
        assert_eq!(single(1, "iload_0"), Ok(vec![]));
        assert_eq!(single(2, "dload_0"), Ok(vec![]));
        assert_eq!(
            message(single(1, "lload_0")),
            "local 0 is out of bounds (max_locals is 1)"
        );
        assert!(single(300, "wide istore 299").is_ok());
        assert!(single(299, "wide istore 299").is_err());

        let too_few = "class demo/T\nmethod m (JI)V\ncode stack 0 locals 3\n0: return\nend\n";
        assert_eq!(
            message(check(too_few)),
            "parameters take 4 local slots but max_locals is 3"
        );
    }

    #[test]
    fn object_creation() {
        assert_eq!(single(0, "new java/lang/Exception"), Ok(vec![]));
        assert!(single(0, "new demo/Unknown").is_ok());
        assert!(single(0, "new [I").is_err());
        assert_eq!(
            message(single(0, "new java/lang/Number")),
            "`new` cannot instantiate the abstract class java/lang/Number"
        );
        assert!(single(0, "new java/lang/CharSequence").is_err());

        assert!(single(0, "anewarray java/lang/String").is_ok());
        assert!(single(0, &format!("anewarray {}I", "[".repeat(254))).is_ok());
        assert!(single(0, &format!("anewarray {}I", "[".repeat(255))).is_err());

        assert!(single(0, "multianewarray [[I 2").is_ok());
        assert!(single(0, "multianewarray [[I 3").is_err());
        assert!(single(0, "multianewarray [[I 0").is_err());
    }

    #[test]
    fn invocations() {
        assert!(single(0, "invokespecial java/lang/Object.<init>()V").is_ok());
        assert!(single(0, "invokevirtual java/lang/Object.<init>()V").is_err());
        assert!(single(0, "invokespecial demo/T.<init>()I").is_err());
        assert_eq!(
            message(single(0, "invokestatic demo/T.<clinit>()V")),
            "class initializers cannot be invoked"
        );

        assert!(single(0, "invokeinterface java/lang/CharSequence.charAt(I)C").is_ok());
        assert!(single(0, "invokeinterface java/lang/CharSequence.charAt(I)C 2").is_ok());
        assert!(single(0, "invokeinterface java/lang/CharSequence.charAt(I)C 3").is_err());
    }

    #[test]
    fn exception_tables() {
        let with_handler = |catch: &str| {
            check(&format!(
                "class demo/T\nmethod static m ()V\ncode stack 1 locals 0\n0: nop\n1: return\n\
                 2: athrow\ncatch {}\nend\n",
                catch
            ))
        };

        assert_eq!(with_handler("0 1 2 java/lang/RuntimeException"), Ok(vec![]));
        assert_eq!(with_handler("0 1 2 any"), Ok(vec![]));
        assert_eq!(
            message(with_handler("1 1 2")),
            "exception handler 0: protected range 1..1 is empty"
        );
        assert!(with_handler("0 1 2 demo/Missing").is_err());
        assert_eq!(
            message(with_handler("0 1 2 java/lang/String")),
            "exception handler 0: catch type java/lang/String is not a subclass of java/lang/Throwable"
        );

        let unprotected = check(
            "class demo/T\nmethod static m ()V\ncode stack 1 locals 0 length 5\n0: goto 4\n\
             4: return\ncatch 1 4 4 any\nend\n",
        );
        assert_eq!(
            unprotected,
            Ok(vec![String::from("exception handler 0 protects no instruction")])
        );
    }

    #[test]
    fn methods_without_code() {
        let unit = "class demo/T\nmethod abstract m ()V\nend\n";
        assert_eq!(check(unit), Ok(vec![]));

        let unit = parse_listing(unit).unwrap();
        let graph = ClassGraph::new();
        let repository = Repository::new();
        let settings = Settings::new();
        let env = Environment::new(&repository, &graph, &settings);
        assert_eq!(
            verify_code_constraints(&env, &unit, 1),
            Err(Error::NoSuchMethod(1))
        );
    }
}
