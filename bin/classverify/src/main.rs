use classverify::jvm::class_graph::ClassGraph;
use classverify::jvm::model::Repository;
use classverify::jvm::{parse_listing, BinaryName, ListingError, Name};
use classverify::passes::{Environment, Session, VerificationResult, VerificationStatus};
use classverify::settings::{Settings, WorklistOrder};

use clap::{crate_version, value_parser, Arg, ArgAction, Command};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::exit;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use walkdir::WalkDir;

fn main() -> io::Result<()> {
    env_logger::init();

    let matches = Command::new("JVM class verifier")
        .version(crate_version!())
        .about("Structurally verify JVM classes written as textual listings")
        .arg(
            Arg::new("classpath")
                .long("classpath")
                .value_name("DIRECTORY")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("Directory searched (recursively) for `.jasm` listings [default: .]"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Number of threads used to verify the methods of a unit"),
        )
        .arg(
            Arg::new("order")
                .long("order")
                .value_parser(["rpo", "dfs"])
                .default_value("rpo")
                .help("Order in which the data-flow analysis revisits instructions"),
        )
        .arg(
            Arg::new("no unreachable warnings")
                .long("no-unreachable-warnings")
                .action(ArgAction::SetTrue)
                .help("Do not warn about code that cannot be reached"),
        )
        .arg(
            Arg::new("UNIT")
                .help("Units to verify (eg. `demo/Point`, `demo.Point`, or `demo/Point.class`)")
                .required(true)
                .action(ArgAction::Append),
        )
        .get_matches();

    let settings = Settings {
        warn_unreachable_code: !matches.get_flag("no unreachable warnings"),
        method_threads: matches.get_one::<usize>("threads").copied().unwrap_or(1),
        worklist_order: match matches.get_one::<String>("order").map(String::as_str) {
            Some("dfs") => WorklistOrder::DepthFirst,
            _ => WorklistOrder::ReversePostorder,
        },
    };

    // Load every listing on the class path
    let class_path: Vec<PathBuf> = match matches.get_many::<PathBuf>("classpath") {
        Some(directories) => directories.cloned().collect(),
        None => vec![PathBuf::from(".")],
    };
    let mut repository = Repository::new();
    let mut class_graph = ClassGraph::with_java_library_types();
    for directory in &class_path {
        load_class_path(directory, &mut repository, &mut class_graph);
    }
    log::info!(
        "Loaded {} units ({} known classes)",
        repository.len(),
        class_graph.len()
    );

    let env = Environment::new(&repository, &class_graph, &settings);
    let session = Session::new(env);
    let stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut count_rejected = 0;

    for argument in matches.get_many::<String>("UNIT").into_iter().flatten() {
        let mut s = stdout.lock();
        let name = match BinaryName::from_unit_argument(argument) {
            Ok(name) => name,
            Err(message) => {
                log::error!("Invalid unit name '{}': {}", argument, message);
                count_rejected += 1;
                continue;
            }
        };

        s.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(s, "Now verifying: {}", name)?;
        s.reset()?;

        let verifier = session.verifier(&name);
        let mut results = vec![verifier.do_pass1(), verifier.do_pass2()];
        print_verdict(&mut s, "Pass 1", &results[0])?;
        print_verdict(&mut s, "Pass 2", &results[1])?;

        if results[1].is_ok() {
            let data_flow = verifier.verify_all_methods();
            let signatures: Vec<String> = match repository.lookup(&name) {
                Some(Ok(unit)) => unit.methods.iter().map(|method| method.signature()).collect(),
                _ => vec![],
            };
            for (index, pass3b) in data_flow.into_iter().enumerate() {
                let signature = signatures.get(index).map_or("", String::as_str);
                let pass3a = verifier.do_pass3a(index);
                print_verdict(
                    &mut s,
                    &format!("Pass 3a, method {} ('{}')", index, signature),
                    &pass3a,
                )?;
                print_verdict(
                    &mut s,
                    &format!("Pass 3b, method {} ('{}')", index, signature),
                    &pass3b,
                )?;
                results.push(pass3a);
                results.push(pass3b);
            }
        }

        writeln!(s, "Warnings:")?;
        let warnings = verifier.messages();
        if warnings.is_empty() {
            writeln!(s, "<none>")?;
        }
        for warning in warnings {
            writeln!(s, "{}", warning)?;
        }
        writeln!(s)?;

        if results
            .iter()
            .any(|result| result.status != VerificationStatus::Ok)
        {
            count_rejected += 1;
        }
        session.release(&name);
    }

    exit(if count_rejected > 0 { 1 } else { 0 })
}

/// Parse every `.jasm` file under a directory into the repository and class graph
///
/// Listings which can't be read or don't parse are still recorded (under the name implied by
/// their path) so that verifying them reports the error.
fn load_class_path(directory: &Path, repository: &mut Repository, class_graph: &mut ClassGraph) {
    let listings = WalkDir::new(directory)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|e| e.is_file() && e.extension().map_or(false, |ex| ex == "jasm"));

    for listing in listings {
        log::debug!("Reading {:?}", listing);
        match read_listing(&listing).and_then(|source| parse_listing(&source)) {
            Ok(unit) => {
                class_graph.add_unit(&unit);
                if let Some(Ok(previous)) = repository.insert(unit) {
                    log::warn!("{:?} replaces an earlier listing of {}", listing, previous.name);
                }
            }
            Err(err) => {
                let relative = listing.strip_prefix(directory).unwrap_or(&listing);
                let implied_name = relative.with_extension("").to_string_lossy().replace('\\', "/");
                match BinaryName::from_string(implied_name) {
                    Ok(name) => {
                        log::warn!("{:?} could not be parsed: {}", listing, err);
                        repository.insert_failed(name, err);
                    }
                    Err(_) => log::error!("{:?} could not be parsed: {}", listing, err),
                }
            }
        }
    }
}

fn read_listing(path: &Path) -> Result<String, ListingError> {
    let bytes = fs::read(path).map_err(|err| ListingError {
        line: 1,
        message: format!("could not read listing: {}", err),
    })?;
    String::from_utf8(bytes).map_err(|err| {
        let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
        ListingError {
            line: valid.iter().filter(|byte| **byte == b'\n').count() + 1,
            message: String::from("listing is not valid UTF-8"),
        }
    })
}

fn print_verdict(
    s: &mut impl WriteColor,
    label: &str,
    result: &VerificationResult,
) -> io::Result<()> {
    let color = match result.status {
        VerificationStatus::Ok => Color::Green,
        VerificationStatus::Failed => Color::Red,
        VerificationStatus::NotRun | VerificationStatus::Cancelled => Color::Yellow,
    };
    s.set_color(ColorSpec::new().set_dimmed(true))?;
    write!(s, "{}: ", label)?;
    s.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(s, "{}", result)?;
    s.reset()?;
    writeln!(s)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unreadable_listings_are_recorded() {
        let directory = std::env::temp_dir().join(format!("classverify-{}", std::process::id()));
        fs::create_dir_all(directory.join("demo")).unwrap();
        fs::write(directory.join("demo/Latin1.jasm"), b"class public demo/Latin1\n# caf\xe9\n")
            .unwrap();
        fs::write(directory.join("demo/Plain.jasm"), "class public demo/Plain\n").unwrap();

        let mut repository = Repository::new();
        let mut class_graph = ClassGraph::with_java_library_types();
        load_class_path(&directory, &mut repository, &mut class_graph);
        fs::remove_dir_all(&directory).unwrap();

        let latin1 = BinaryName::from_str("demo/Latin1").unwrap();
        match repository.lookup(&latin1) {
            Some(Err(err)) => assert_eq!(err.to_string(), "line 2: listing is not valid UTF-8"),
            other => panic!("unexpected entry {:?}", other.map(|entry| entry.is_ok())),
        }
        let plain = BinaryName::from_str("demo/Plain").unwrap();
        assert!(matches!(repository.lookup(&plain), Some(Ok(_))));
    }
}
