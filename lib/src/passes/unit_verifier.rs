use super::{Environment, Error, Pass, PassRecord, VerificationResult, VerificationStatus};
use crate::jvm::model::Method;
use crate::jvm::BinaryName;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Cached outcome of one pass (empty until the pass runs, or after a flush)
type Slot = Mutex<Option<PassRecord>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<PassRecord>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Result slots of the per-method passes of one method
#[derive(Default)]
struct MethodSlots {
    code_constraints: Slot,
    data_flow: Slot,
}

/// Runs the passes over one unit, caching every result
///
/// Each (pass, method) result is computed at most once until the verifier is flushed. The
/// computation happens while the slot for the result is locked, so concurrent requests for the
/// same result wait for the first one instead of repeating it. Prerequisites are resolved before
/// any slot is locked.
///
/// Flushing while passes of the same unit are running is allowed, but results computed from
/// prerequisites that were flushed part way through may end up cached.
pub struct UnitVerifier<'a> {
    name: BinaryName,
    env: Environment<'a>,
    structure: Slot,
    statics: Slot,
    methods: Vec<MethodSlots>,
}

impl<'a> UnitVerifier<'a> {
    pub fn new(name: BinaryName, env: Environment<'a>) -> UnitVerifier<'a> {
        let method_count = env.unit(&name).map_or(0, |unit| unit.methods.len());
        UnitVerifier {
            name,
            env,
            structure: Slot::default(),
            statics: Slot::default(),
            methods: (0..method_count).map(|_| MethodSlots::default()).collect(),
        }
    }

    pub fn name(&self) -> &BinaryName {
        &self.name
    }

    /// Number of methods in the unit (zero if the unit did not load)
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn do_pass1(&self) -> VerificationResult {
        self.run_pass(Pass::Structure, 0)
    }

    pub fn do_pass2(&self) -> VerificationResult {
        self.run_pass(Pass::Statics, 0)
    }

    pub fn do_pass3a(&self, method: usize) -> VerificationResult {
        self.run_pass(Pass::CodeConstraints, method)
    }

    pub fn do_pass3b(&self, method: usize) -> VerificationResult {
        self.run_pass(Pass::DataFlow, method)
    }

    fn slot(&self, pass: Pass, method: usize) -> Option<&Slot> {
        match pass {
            Pass::Structure => Some(&self.structure),
            Pass::Statics => Some(&self.statics),
            Pass::CodeConstraints => self.methods.get(method).map(|slots| &slots.code_constraints),
            Pass::DataFlow => self.methods.get(method).map(|slots| &slots.data_flow),
        }
    }

    fn describe(&self, pass: Pass, method: usize) -> String {
        if pass.is_per_method() {
            format!("{} of {} (method {})", pass.label(), self.name, method)
        } else {
            format!("{} of {}", pass.label(), self.name)
        }
    }

    /// Run a pass (after its prerequisites), or return its cached result
    ///
    /// `method` is ignored by passes which are not per-method.
    pub fn run_pass(&self, pass: Pass, method: usize) -> VerificationResult {
        let slot = match self.slot(pass, method) {
            Some(slot) => slot,
            None => return VerificationResult::failed(Error::NoSuchMethod(method).to_string()),
        };

        let blocked_by = match pass.prerequisite() {
            None => None,
            Some(prerequisite) => {
                let result = self.run_pass(prerequisite, method);
                match result.status {
                    VerificationStatus::Ok => None,
                    VerificationStatus::Cancelled => return result,
                    _ => Some(prerequisite),
                }
            }
        };

        let mut cached = lock(slot);
        if let Some(record) = &*cached {
            log::debug!("{}: cached {}", self.describe(pass, method), record.result);
            return record.result.clone();
        }

        let record = if let Some(prerequisite) = blocked_by {
            PassRecord {
                result: VerificationResult::not_run(format!(
                    "{} did not succeed",
                    prerequisite.label()
                )),
                messages: vec![],
            }
        } else {
            log::info!("running {}", self.describe(pass, method));
            match pass.run(&self.env, &self.name, method) {
                Ok(messages) => PassRecord {
                    result: VerificationResult::ok(),
                    messages,
                },
                Err(err) if err.is_cancellation() => {
                    log::debug!("{} was cancelled", self.describe(pass, method));
                    return VerificationResult::cancelled();
                }
                Err(err) => PassRecord {
                    result: VerificationResult::failed(err.to_string()),
                    messages: vec![],
                },
            }
        };

        let result = record.result.clone();
        *cached = Some(record);
        result
    }

    /// Run pass 3b (and everything it depends on) for every method
    ///
    /// Methods are spread over `Settings::method_threads` worker threads. Results are in method
    /// order.
    pub fn verify_all_methods(&self) -> Vec<VerificationResult> {
        let count = self.method_count();
        let threads = self.env.settings.method_threads.min(count);
        if threads <= 1 {
            return (0..count).map(|method| self.do_pass3b(method)).collect();
        }

        let mut results = vec![VerificationResult::not_run(""); count];
        std::thread::scope(|scope| {
            let workers: Vec<_> = (0..threads)
                .map(|worker| {
                    scope.spawn(move || {
                        (worker..count)
                            .step_by(threads)
                            .map(|method| (method, self.do_pass3b(method)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for worker in workers {
                match worker.join() {
                    Ok(done) => {
                        for (method, result) in done {
                            results[method] = result;
                        }
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });
        results
    }

    /// Warnings from every pass that has run, in pass order then method order
    pub fn messages(&self) -> Vec<String> {
        let unit = self.env.unit(&self.name).ok();
        let mut messages = vec![];

        for (pass, slot) in [(Pass::Structure, &self.structure), (Pass::Statics, &self.statics)] {
            if let Some(record) = &*lock(slot) {
                for message in &record.messages {
                    messages.push(format!("{}: {}", pass.label(), message));
                }
            }
        }

        for (index, slots) in self.methods.iter().enumerate() {
            let signature = unit
                .and_then(|unit| unit.methods.get(index))
                .map(Method::signature)
                .unwrap_or_default();
            for (pass, slot) in [
                (Pass::CodeConstraints, &slots.code_constraints),
                (Pass::DataFlow, &slots.data_flow),
            ] {
                if let Some(record) = &*lock(slot) {
                    for message in &record.messages {
                        messages.push(format!(
                            "{}, method {} ('{}'): {}",
                            pass.label(),
                            index,
                            signature,
                            message
                        ));
                    }
                }
            }
        }

        messages
    }

    /// Forget every cached result and warning
    pub fn flush(&self) {
        log::debug!("flushing {}", self.name);
        *lock(&self.structure) = None;
        *lock(&self.statics) = None;
        for slots in &self.methods {
            *lock(&slots.code_constraints) = None;
            *lock(&slots.data_flow) = None;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::ClassGraph;
    use crate::jvm::model::Repository;
    use crate::jvm::{parse_listing, Name};
    use crate::settings::Settings;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Barrier;

    const COUNTER: &str = "
class public demo/Counter
method public static next (I)I
  code stack 2 locals 1
    0: iload_0
    1: iconst_1
    2: iadd
    3: ireturn
    4: nop
end
method public static wrong ()J
  code stack 1 locals 0
    0: iconst_0
    1: lreturn
end
method public static blocked ()V
  code stack 0 locals 0
    0: invokestatic demo/Counter.<clinit>()V
    3: return
end
";

    fn fixture(listing: &str) -> (Repository, ClassGraph) {
        let unit = parse_listing(listing).unwrap();
        let mut graph = ClassGraph::with_java_library_types();
        graph.add_unit(&unit);
        let mut repository = Repository::new();
        repository.insert(unit);
        (repository, graph)
    }

    fn counter() -> BinaryName {
        BinaryName::from_str("demo/Counter").unwrap()
    }

    #[test]
    fn passes_are_cached() {
        let (repository, graph) = fixture(COUNTER);
        let settings = Settings::new();
        let env = Environment::new(&repository, &graph, &settings);
        let verifier = UnitVerifier::new(counter(), env);
        assert_eq!(verifier.method_count(), 3);

        assert!(verifier.do_pass3b(0).is_ok());
        let warnings = verifier.messages();
        assert_eq!(
            warnings,
            vec![String::from(
                "Pass 3b, method 0 ('public static next(I)I'): unreachable code at offsets 4"
            )]
        );

        assert!(verifier.do_pass3b(0).is_ok());
        assert!(verifier.do_pass1().is_ok());
        assert_eq!(verifier.messages(), warnings);

        let wrong = verifier.do_pass3b(1);
        assert_eq!(wrong.status, VerificationStatus::Failed);
        assert_eq!(verifier.do_pass3b(1), wrong);
    }

    #[test]
    fn same_method_from_many_threads() {
        let (repository, graph) = fixture(COUNTER);
        let settings = Settings::new();
        let env = Environment::new(&repository, &graph, &settings);
        let verifier = UnitVerifier::new(counter(), env);
        let start = Barrier::new(8);

        let results: Vec<VerificationResult> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        start.wait();
                        verifier.do_pass3b(0)
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert!(results.iter().all(|result| result == &VerificationResult::ok()));
        assert_eq!(
            verifier.messages(),
            vec![String::from(
                "Pass 3b, method 0 ('public static next(I)I'): unreachable code at offsets 4"
            )]
        );
    }

    #[test]
    fn failed_prerequisites_gate_later_passes() {
        let (repository, graph) = fixture(COUNTER);
        let settings = Settings::new();
        let env = Environment::new(&repository, &graph, &settings);
        let verifier = UnitVerifier::new(counter(), env);

        assert_eq!(verifier.do_pass3a(2).status, VerificationStatus::Failed);
        assert_eq!(
            verifier.do_pass3b(2),
            VerificationResult::not_run("Pass 3a did not succeed")
        );
        assert_eq!(
            verifier.do_pass3b(3).to_string(),
            "VERIFIED_REJECTED: there is no method with index 3"
        );

        let (repository, graph) = fixture("class public final demo/Counter extends java/lang/String");
        let env = Environment::new(&repository, &graph, &settings);
        let verifier = UnitVerifier::new(counter(), env);
        assert_eq!(verifier.do_pass2().status, VerificationStatus::Failed);
        assert_eq!(verifier.method_count(), 0);

        let missing = UnitVerifier::new(BinaryName::from_str("demo/Missing").unwrap(), env);
        assert_eq!(
            missing.do_pass1().to_string(),
            "VERIFIED_REJECTED: unit demo/Missing could not be found"
        );
        assert_eq!(
            missing.do_pass2(),
            VerificationResult::not_run("Pass 1 did not succeed")
        );
    }

    #[test]
    fn flush_forgets_results() {
        let (repository, graph) = fixture(COUNTER);
        let settings = Settings::new();
        let env = Environment::new(&repository, &graph, &settings);
        let verifier = UnitVerifier::new(counter(), env);

        assert!(verifier.do_pass3b(0).is_ok());
        assert_eq!(verifier.messages().len(), 1);

        verifier.flush();
        assert!(verifier.messages().is_empty());
        assert!(verifier.do_pass3b(0).is_ok());
        assert_eq!(verifier.messages().len(), 1);
    }

    #[test]
    fn cancelled_results_are_not_cached() {
        let (repository, graph) = fixture(COUNTER);
        let settings = Settings::new();
        let cancel = AtomicBool::new(true);
        let env = Environment::new(&repository, &graph, &settings).with_cancellation(&cancel);
        let verifier = UnitVerifier::new(counter(), env);

        assert_eq!(verifier.do_pass3b(0), VerificationResult::cancelled());
        assert!(verifier.do_pass3a(0).is_ok());

        cancel.store(false, Ordering::Relaxed);
        assert!(verifier.do_pass3b(0).is_ok());
    }

    #[test]
    fn methods_on_worker_threads() {
        let (repository, graph) = fixture(COUNTER);
        let sequential = Settings::new();
        let env = Environment::new(&repository, &graph, &sequential);
        let expected = UnitVerifier::new(counter(), env).verify_all_methods();

        let parallel = Settings {
            method_threads: 4,
            ..Settings::new()
        };
        let env = Environment::new(&repository, &graph, &parallel);
        let verifier = UnitVerifier::new(counter(), env);
        assert_eq!(verifier.verify_all_methods(), expected);
        assert_eq!(
            expected.iter().map(|result| result.status).collect::<Vec<_>>(),
            vec![
                VerificationStatus::Ok,
                VerificationStatus::Failed,
                VerificationStatus::NotRun
            ]
        );
    }
}
