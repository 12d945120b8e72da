use super::{Environment, Error};
use crate::jvm::code::{Code, MAX_CODE_LENGTH};
use crate::jvm::model::Method;
use crate::jvm::BinaryName;
use crate::util::Offset;
use std::collections::HashSet;

/// Check that the unit loaded and that its members are well-formed containers
pub fn verify_structure(env: &Environment, name: &BinaryName) -> Result<Vec<String>, Error> {
    let unit = env.unit(name)?;

    let mut fields = HashSet::new();
    for field in &unit.fields {
        if !fields.insert((&field.name, &field.descriptor)) {
            return Err(Error::Structure(format!(
                "field {} {} is declared more than once",
                field.name, field.descriptor
            )));
        }
    }

    let mut methods = HashSet::new();
    for (index, method) in unit.methods.iter().enumerate() {
        if !methods.insert((&method.name, &method.descriptor)) {
            return Err(Error::Structure(format!(
                "method {}{} is declared more than once",
                method.name, method.descriptor
            )));
        }
        verify_method_structure(index, method)?;
    }

    Ok(vec![])
}

fn verify_method_structure(index: usize, method: &Method) -> Result<(), Error> {
    let malformed = |message: String| {
        Error::Structure(format!(
            "method {} ('{}'): {}",
            index,
            method.signature(),
            message
        ))
    };

    let code = match (&method.code, method.expects_code()) {
        (Some(code), true) => code,
        (None, false) => return Ok(()),
        (Some(_), false) => {
            return Err(malformed(String::from(
                "abstract and native methods cannot have code",
            )))
        }
        (None, true) => return Err(malformed(String::from("missing code"))),
    };

    check_code_layout(code).map_err(malformed)
}

/// Offsets of instructions and exception handlers must lie within the code array
fn check_code_layout(code: &Code) -> Result<(), String> {
    if code.instructions.is_empty() {
        return Err(String::from("code is empty"));
    }
    if code.length > MAX_CODE_LENGTH {
        return Err(format!(
            "code length {} exceeds the maximum of {}",
            code.length, MAX_CODE_LENGTH
        ));
    }

    let mut expected_min = Offset(0);
    for (position, (offset, _)) in code.instructions.iter().enumerate() {
        if position == 0 && *offset != Offset(0) {
            return Err(format!("first instruction is at offset {} instead of 0", offset));
        }
        if *offset < expected_min {
            return Err(format!("instruction offset {} is out of order", offset));
        }
        if offset.0 >= code.length {
            return Err(format!(
                "instruction offset {} is past the code length {}",
                offset, code.length
            ));
        }
        expected_min = Offset(offset.0 + 1);
    }

    for (index, handler) in code.exception_table.iter().enumerate() {
        let in_bounds = handler.start.0 < code.length
            && handler.end.0 <= code.length
            && handler.handler.0 < code.length;
        if !in_bounds {
            return Err(format!(
                "exception handler {} refers to offsets outside of the code",
                index
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::{BranchInstruction, ExceptionHandler, Instruction};
    use crate::jvm::{MethodAccessFlags, MethodDescriptor, Name, UnqualifiedName};

    fn code(offsets: &[usize], length: usize) -> Code {
        Code {
            max_stack: 1,
            max_locals: 0,
            length,
            instructions: offsets
                .iter()
                .map(|offset| (Offset(*offset), Instruction::Nop.into()))
                .chain(std::iter::once((
                    Offset(length - 1),
                    BranchInstruction::Return.into(),
                )))
                .collect(),
            exception_table: vec![],
        }
    }

    #[test]
    fn code_layout() {
        assert_eq!(check_code_layout(&code(&[0, 1], 3)), Ok(()));
        assert!(check_code_layout(&code(&[1], 3)).is_err());
        assert!(check_code_layout(&code(&[0, 0], 3)).is_err());
        assert!(check_code_layout(&code(&[0, 2], 2)).is_err());
        assert!(check_code_layout(&code(&[0], MAX_CODE_LENGTH + 1)).is_err());

        let mut with_handler = code(&[0], 2);
        with_handler.exception_table.push(ExceptionHandler {
            start: Offset(0),
            end: Offset(3),
            handler: Offset(1),
            catch_type: None,
        });
        assert_eq!(
            check_code_layout(&with_handler),
            Err(String::from(
                "exception handler 0 refers to offsets outside of the code"
            ))
        );
    }

    #[test]
    fn code_presence() {
        let mut method = Method {
            name: UnqualifiedName::from_str("run").unwrap(),
            descriptor: MethodDescriptor {
                parameters: vec![],
                return_type: None,
            },
            access_flags: MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT,
            code: None,
        };
        assert_eq!(verify_method_structure(0, &method), Ok(()));

        method.code = Some(code(&[], 1));
        assert_eq!(
            verify_method_structure(2, &method),
            Err(Error::Structure(String::from(
                "method 2 ('public abstract run()V'): abstract and native methods cannot have code"
            )))
        );

        method.access_flags = MethodAccessFlags::PUBLIC;
        assert_eq!(verify_method_structure(0, &method), Ok(()));

        method.code = None;
        assert!(verify_method_structure(0, &method).is_err());
    }
}
