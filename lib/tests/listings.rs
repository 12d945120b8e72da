//! Runs every listing under `tests/listings` through all of the passes
//!
//! Each listing starts with comment lines saying what to expect:
//!
//! ```text
//! # expect: 2 ok
//! # expect: 3b 0 rejected use of uninitialized object
//! # warning: Pass 3b, method 0 ('public static dead()V'): unreachable code at offsets 1, 2
//! ```
//!
//! An `expect` line names the pass (`1`, `2`, `3a`, or `3b`), the method index for per-method
//! passes, the verdict (`ok`, `rejected`, `notyet`), and optionally text that the verdict message
//! must contain. A `warning` line is a message the unit verifier must report once the expected
//! passes have run.

use classverify::jvm::class_graph::ClassGraph;
use classverify::jvm::model::Repository;
use classverify::jvm::{parse_listing, BinaryName, Name};
use classverify::passes::{Environment, Pass, Session, VerificationStatus};
use classverify::settings::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

struct Expectation {
    line: usize,
    pass: Pass,
    method: usize,
    status: VerificationStatus,
    message: String,
}

struct Fixture {
    path: PathBuf,
    name: BinaryName,
    expectations: Vec<Expectation>,
    warnings: Vec<String>,
}

/// Split off the first whitespace-separated word
fn next_word<'s>(rest: &mut &'s str) -> Option<&'s str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (word, remainder) = trimmed.split_at(end);
    *rest = remainder.trim_start();
    Some(word)
}

fn parse_expectation(line: usize, mut rest: &str) -> Result<Expectation, String> {
    let pass = match next_word(&mut rest) {
        Some("1") => Pass::Structure,
        Some("2") => Pass::Statics,
        Some("3a") => Pass::CodeConstraints,
        Some("3b") => Pass::DataFlow,
        other => return Err(format!("line {}: unknown pass {:?}", line, other)),
    };
    let method = if pass.is_per_method() {
        next_word(&mut rest)
            .and_then(|word| word.parse().ok())
            .ok_or_else(|| format!("line {}: missing method index", line))?
    } else {
        0
    };
    let status = match next_word(&mut rest) {
        Some("ok") => VerificationStatus::Ok,
        Some("rejected") => VerificationStatus::Failed,
        Some("notyet") => VerificationStatus::NotRun,
        other => return Err(format!("line {}: unknown verdict {:?}", line, other)),
    };
    Ok(Expectation {
        line,
        pass,
        method,
        status,
        message: rest.trim().to_owned(),
    })
}

/// Load every listing under a directory, collecting the expectations written in their headers
fn load_fixtures(
    root: &Path,
    repository: &mut Repository,
    class_graph: &mut ClassGraph,
) -> Vec<Fixture> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|e| e.is_file() && e.extension().map_or(false, |ex| ex == "jasm"))
        .collect();
    paths.sort();

    let mut fixtures = vec![];
    for path in paths {
        let source = fs::read_to_string(&path).unwrap();

        let mut expectations = vec![];
        let mut warnings = vec![];
        for (idx, line) in source.lines().enumerate() {
            if let Some(rest) = line.strip_prefix("# expect:") {
                let expectation = parse_expectation(idx + 1, rest)
                    .unwrap_or_else(|err| panic!("{:?}: {}", path, err));
                expectations.push(expectation);
            } else if let Some(rest) = line.strip_prefix("# warning:") {
                warnings.push(rest.trim().to_owned());
            }
        }

        let name = match parse_listing(&source) {
            Ok(unit) => {
                let name = unit.name.clone();
                class_graph.add_unit(&unit);
                repository.insert(unit);
                name
            }
            Err(err) => {
                let relative = path.strip_prefix(root).unwrap().with_extension("");
                let name = BinaryName::from_string(relative.to_string_lossy().replace('\\', "/"))
                    .unwrap();
                repository.insert_failed(name.clone(), err);
                name
            }
        };

        fixtures.push(Fixture {
            path,
            name,
            expectations,
            warnings,
        });
    }
    fixtures
}

fn check_listings(settings: &Settings) {
    let _ = env_logger::builder().is_test(true).try_init();

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/listings");
    let mut repository = Repository::new();
    let mut class_graph = ClassGraph::with_java_library_types();
    let fixtures = load_fixtures(&root, &mut repository, &mut class_graph);
    assert!(!fixtures.is_empty(), "no listings found in {:?}", root);

    let session = Session::new(Environment::new(&repository, &class_graph, settings));
    let mut failures = vec![];

    for fixture in &fixtures {
        assert!(
            !fixture.expectations.is_empty(),
            "{:?} has no expectations",
            fixture.path
        );
        let verifier = session.verifier(&fixture.name);
        if settings.method_threads > 1 {
            verifier.verify_all_methods();
        }

        for expectation in &fixture.expectations {
            let result = verifier.run_pass(expectation.pass, expectation.method);
            if result.status != expectation.status || !result.message.contains(&expectation.message)
            {
                failures.push(format!(
                    "{:?}:{}: expected {:?} containing {:?}, got {}",
                    fixture.path, expectation.line, expectation.status, expectation.message, result
                ));
            }
        }

        let messages = verifier.messages();
        for warning in &fixture.warnings {
            if !messages.contains(warning) {
                failures.push(format!(
                    "{:?}: missing warning {:?} (got {:?})",
                    fixture.path, warning, messages
                ));
            }
        }

        session.release(&fixture.name);
    }

    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
}

#[test]
fn listings_in_reverse_postorder() {
    check_listings(&Settings::new());
}

#[test]
fn listings_depth_first_on_worker_threads() {
    let settings = Settings {
        method_threads: 3,
        worklist_order: classverify::settings::WorklistOrder::DepthFirst,
        ..Settings::new()
    };
    check_listings(&settings);
}
