use std::{cell::Cell, env, fs, rc::Rc};

use nestest::{Counters, Harness, Registry};
use pretty_assertions::assert_eq;

mod lib;
mod suites;

use lib::{Buffer, config, run, sanitize_output};

fn registry() -> Registry {
    Registry::new()
        .with_suite("suites/basic.rs", suites::basic)
        .with_suite("suites/failing.rs", suites::failing)
}

fn banner() -> String {
    format!("\nnestest {}\n\n", env!("CARGO_PKG_VERSION"))
}

#[test]
fn basic() {
    let (report, output) = run(config(), &registry(), ["suites/basic.rs"]);

    assert_eq!(report.counters, Counters { passed: 3, failed: 0 });
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        sanitize_output(&output),
        banner()
            + "Basic test running\n\
               ✔ Adds numbers\n\
               ✔ Prints while passing\n\
               \x20 Nested suite\n\
               \x20 ✔ Compares strings\n\
               \n\
               \n\
               3 tests passed.\n\
               \n\
               \n\
               Took <duration> seconds.\n\
               \n"
    );
}

#[test]
fn failing() {
    let (report, output) = run(config(), &registry(), ["suites/failing.rs"]);

    assert_eq!(report.counters, Counters { passed: 0, failed: 4 });
    assert_eq!(report.exit_code(), 4);
    assert_eq!(report.failures.len(), 4);

    let assertion = "1 + 1 == 3 in tests/output/suites.rs on line <line> of suites/failing.rs";
    let runtime = "Error panic with message called `Option::unwrap()` on a `None` value \
                   in tests/output/suites.rs on line <line> of suites/failing.rs";
    let exception = "Caught exception output::suites::Timeout with message took too long \
                     in tests/output/suites.rs on line <line> of suites/failing.rs";
    let assert_eq = "`left == right` failed left: 3 right: 4 \
                     in tests/output/suites.rs on line <line> of suites/failing.rs";

    let expected = format!(
        "{banner}Failing tests\n\
         ✘ Asserts\n\
         \x20 [!] {assertion}\n\
         ✘ Unwraps nothing\n\
         \x20 [!] {runtime}\n\
         ✘ Waits\n\
         \x20 [!] {exception}\n\
         ✘ Prints before failing\n\
         \x20 [!] {assert_eq}\n\
         \x20   state = 3\n\
         \n\
         \n\
         {assertion}\n\n\
         {runtime}\n\n\
         {exception}\n\n\
         {assert_eq}\n\n\
         4 tests failed!\n\
         \n\
         \n\
         \n\
         Took <duration> seconds.\n\
         \n",
        banner = banner()
    );
    assert_eq!(sanitize_output(&output), expected);
}

#[test]
fn hooks_wrap_every_leaf() {
    let before = Rc::new(Cell::new(0));
    let after = Rc::new(Cell::new(0));
    let registry = Registry::new().with_suite("suites/hooks.rs", {
        let (before, after) = (Rc::clone(&before), Rc::clone(&after));
        move || suites::hooks(Rc::clone(&before), Rc::clone(&after))
    });

    let (report, output) = run(config(), &registry, ["suites/hooks.rs"]);

    assert_eq!(report.counters, Counters { passed: 2, failed: 1 });
    assert_eq!(before.get(), 3);
    assert_eq!(after.get(), 3);
    assert!(report.failures[0].contains("third fails"));
    assert!(sanitize_output(&output).contains("Hooks\n✔ First\n  Inner\n  ✔ Second\n  ✘ Third\n"));
}

#[test]
fn filter_skips_other_files() {
    let (report, output) = run(
        config().with_filter(String::from("BASIC")),
        &registry(),
        ["suites/basic.rs", "suites/failing.rs"],
    );

    assert_eq!(report.counters, Counters { passed: 3, failed: 0 });
    assert!(!output.contains("Failing tests"));
}

#[test]
fn run_dir_discovers_and_skips() {
    let root = env::temp_dir().join(format!("nestest-output-{}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("suites")).unwrap();
    for file in ["basic.rs", "failing.rs", "helpers.rs"] {
        fs::write(root.join("suites").join(file), "").unwrap();
    }

    let buffer = Buffer::default();
    let report = Harness::with_target(config(), buffer.clone())
        .unwrap()
        .run_dir(&registry(), root.join("suites"))
        .unwrap();

    assert_eq!(report.counters, Counters { passed: 3, failed: 4 });
    assert_eq!(report.exit_code(), 4);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].ends_with("helpers.rs"));
    let output = buffer.try_to_string().unwrap();
    assert!(output.contains("No tests found in "));
    assert!(output.contains("helpers.rs, skipping...\n"));

    fs::remove_dir_all(&root).unwrap();
}
