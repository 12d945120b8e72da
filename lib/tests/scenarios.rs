//! End-to-end scenarios, with method bodies built directly out of instructions

use classverify::jvm::class_graph::ClassGraph;
use classverify::jvm::code::{
    BranchInstruction, Code, EqComparison, ExceptionHandler, Insn, Instruction, InvokeType,
    MethodRef, OrdComparison,
};
use classverify::jvm::model::{Method, Repository, Unit};
use classverify::jvm::{
    BinaryName, ClassAccessFlags, MethodAccessFlags, MethodDescriptor, Name, ParseDescriptor,
    RefType, UnqualifiedName,
};
use classverify::passes::{Environment, Session, VerificationResult, VerificationStatus};
use classverify::settings::Settings;
use classverify::util::Offset;

fn name(name: &str) -> BinaryName {
    BinaryName::from_str(name).unwrap()
}

fn static_method(
    method_name: &str,
    descriptor: &str,
    max_locals: u16,
    body: Vec<(usize, Insn)>,
) -> Method {
    static_method_with_handlers(method_name, descriptor, max_locals, body, vec![])
}

fn static_method_with_handlers(
    method_name: &str,
    descriptor: &str,
    max_locals: u16,
    body: Vec<(usize, Insn)>,
    exception_table: Vec<ExceptionHandler>,
) -> Method {
    let length = body.last().map_or(0, |(offset, _)| offset + 1);
    Method {
        name: UnqualifiedName::from_str(method_name).unwrap(),
        descriptor: MethodDescriptor::parse(descriptor).unwrap(),
        access_flags: MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        code: Some(Code {
            max_stack: 4,
            max_locals,
            length,
            instructions: body
                .into_iter()
                .map(|(offset, insn)| (Offset(offset), insn))
                .collect(),
            exception_table,
        }),
    }
}

/// Unit `demo/Scenario` with the given methods
fn scenario(methods: Vec<Method>) -> (Repository, ClassGraph) {
    let mut unit = Unit::new(
        name("demo/Scenario"),
        ClassAccessFlags::PUBLIC,
        Some(BinaryName::OBJECT),
    );
    unit.methods = methods;
    let mut graph = ClassGraph::with_java_library_types();
    graph.add_unit(&unit);
    let mut repository = Repository::new();
    repository.insert(unit);
    (repository, graph)
}

fn verify_first_method(methods: Vec<Method>) -> VerificationResult {
    let (repository, graph) = scenario(methods);
    let settings = Settings::new();
    let session = Session::new(Environment::new(&repository, &graph, &settings));
    let verifier = session.verifier(&name("demo/Scenario"));
    verifier.do_pass3b(0)
}

#[test]
fn constant_return_verifies() {
    let result = verify_first_method(vec![static_method(
        "one",
        "()I",
        0,
        vec![
            (0, Instruction::IConst1.into()),
            (1, BranchInstruction::IReturn.into()),
        ],
    )]);
    assert_eq!(result, VerificationResult::ok());
}

#[test]
fn int_and_reference_paths_conflict() {
    let result = verify_first_method(vec![static_method(
        "choose",
        "(I)I",
        1,
        vec![
            (0, Instruction::ILoad(0).into()),
            (1, BranchInstruction::If(OrdComparison::EQ, Offset(8)).into()),
            (4, Instruction::IConst1.into()),
            (5, BranchInstruction::Goto(Offset(9)).into()),
            (8, Instruction::AConstNull.into()),
            (9, BranchInstruction::IReturn.into()),
        ],
    )]);
    assert_eq!(result.status, VerificationStatus::Failed);
    assert!(
        result.message.starts_with("offset 9 (IReturn): expected int but found top"),
        "{}",
        result
    );
}

#[test]
fn different_stack_heights_conflict() {
    let result = verify_first_method(vec![static_method(
        "uneven",
        "(Ljava/lang/Object;)V",
        1,
        vec![
            (0, Instruction::ALoad(0).into()),
            (1, BranchInstruction::IfNull(EqComparison::EQ, Offset(6)).into()),
            (4, Instruction::IConst0.into()),
            (5, Instruction::IConst0.into()),
            (6, BranchInstruction::Return.into()),
        ],
    )]);
    assert_eq!(result.status, VerificationStatus::Failed);
    assert!(
        result.message.contains("incompatible stack shapes at join"),
        "{}",
        result
    );
    assert!(result.message.starts_with("offset 6 "), "{}", result);
}

#[test]
fn method_call_on_uninitialized_object() {
    let result = verify_first_method(vec![static_method(
        "eager",
        "()Ljava/lang/String;",
        0,
        vec![
            (0, Instruction::New(RefType::Object(BinaryName::STRINGBUILDER)).into()),
            (3, Instruction::Dup.into()),
            (
                4,
                Instruction::Invoke(
                    InvokeType::Virtual,
                    MethodRef {
                        class: BinaryName::STRINGBUILDER,
                        name: UnqualifiedName::from_str("toString").unwrap(),
                        descriptor: MethodDescriptor::parse("()Ljava/lang/String;").unwrap(),
                    },
                )
                .into(),
            ),
            (7, BranchInstruction::AReturn.into()),
        ],
    )]);
    assert_eq!(
        result.to_string(),
        "VERIFIED_REJECTED: offset 4 (Invoke(Virtual, java/lang/StringBuilder.toString()Ljava/lang/String;)): \
         use of uninitialized object uninitialized(java/lang/StringBuilder@0)"
    );
}

#[test]
fn branch_into_the_middle_of_an_instruction() {
    let result = verify_first_method(vec![static_method(
        "jump",
        "()V",
        0,
        vec![
            (0, BranchInstruction::Goto(Offset(2)).into()),
            (3, BranchInstruction::Return.into()),
        ],
    )]);
    assert_eq!(result.status, VerificationStatus::Failed);
    assert!(
        result
            .message
            .ends_with("offset 2 is not the start of an instruction"),
        "{}",
        result
    );
}

#[test]
fn handlers_ignore_the_protected_stack() {
    let result = verify_first_method(vec![static_method_with_handlers(
        "guarded",
        "()I",
        0,
        vec![
            (0, Instruction::IConst1.into()),
            (1, Instruction::IConst2.into()),
            (2, Instruction::IAdd.into()),
            (3, BranchInstruction::IReturn.into()),
            (4, Instruction::Pop.into()),
            (5, Instruction::IConst0.into()),
            (6, BranchInstruction::IReturn.into()),
        ],
        vec![ExceptionHandler {
            start: Offset(0),
            end: Offset(4),
            handler: Offset(4),
            catch_type: Some(BinaryName::RUNTIMEEXCEPTION),
        }],
    )]);
    assert_eq!(result, VerificationResult::ok());
}

#[test]
fn orchestration_is_idempotent_and_flushable() {
    let (repository, graph) = scenario(vec![
        static_method(
            "dead",
            "()V",
            0,
            vec![
                (0, BranchInstruction::Return.into()),
                (1, BranchInstruction::Return.into()),
            ],
        ),
        static_method(
            "broken",
            "()V",
            0,
            vec![(0, Instruction::Pop.into()), (1, BranchInstruction::Return.into())],
        ),
    ]);
    let settings = Settings::new();
    let session = Session::new(Environment::new(&repository, &graph, &settings));
    let unit_name = name("demo/Scenario");
    let verifier = session.verifier(&unit_name);

    let first = (verifier.do_pass3b(0), verifier.do_pass3b(1));
    let messages = verifier.messages();
    assert_eq!(
        messages,
        vec![String::from(
            "Pass 3b, method 0 ('public static dead()V'): unreachable code at offsets 1"
        )]
    );
    assert_eq!(first.1.status, VerificationStatus::Failed);

    // Asking again hits the cache
    assert_eq!((verifier.do_pass3b(0), verifier.do_pass3b(1)), first);
    assert_eq!(verifier.messages(), messages);

    // Flushing forgets everything, and the next request recomputes the same thing
    verifier.flush();
    assert!(verifier.messages().is_empty());
    assert_eq!(verifier.do_pass3b(0), first.0);
    assert_eq!(verifier.messages(), messages);

    assert!(session.release(&unit_name));
    assert!(session.verifiers().is_empty());
}

#[test]
fn failed_declarations_gate_data_flow() {
    let mut unit = Unit::new(
        name("demo/Gated"),
        ClassAccessFlags::PUBLIC,
        Some(BinaryName::STRING),
    );
    unit.methods.push(static_method(
        "fine",
        "()V",
        0,
        vec![(0, BranchInstruction::Return.into())],
    ));
    let mut graph = ClassGraph::with_java_library_types();
    graph.add_unit(&unit);
    let mut repository = Repository::new();
    repository.insert(unit);
    let settings = Settings::new();
    let session = Session::new(Environment::new(&repository, &graph, &settings));
    let verifier = session.verifier(&name("demo/Gated"));

    assert_eq!(verifier.do_pass3b(0).status, VerificationStatus::NotRun);
    assert_eq!(verifier.do_pass3a(0).status, VerificationStatus::NotRun);
    assert_eq!(verifier.do_pass2().status, VerificationStatus::Failed);
    assert!(verifier.do_pass1().is_ok());
}
