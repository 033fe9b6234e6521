//! Suites registered at link time, run through the command line entry point.
//!
//! `cargo run --example registry -- demos` discovers every `.rs` file below
//! `demos/`. This file has a suite registered for it, the others are skipped.

use std::process::ExitCode;

use nestest::{Registry, assert_eq, cli, prelude::*};

pub struct Suite {
    pub path: &'static str,
    pub build: fn() -> Definition,
}

#[linkme::distributed_slice]
pub static SUITES: [Suite];

#[linkme::distributed_slice(SUITES)]
static STRINGS: Suite = Suite {
    path: "demos/registry.rs",
    build: strings,
};

fn strings() -> Definition {
    Definition::new("/** String handling */", "", |_| {
        steps![
            leaf("/** Uppercases ascii */", || assert_eq!("nest".to_uppercase(), "NEST")),
            leaf("/** Counts chars, not bytes */", || assert_eq!("é".chars().count(), 1)),
            suite("/** Splitting */", |_| {
                steps![leaf("/** Splits on whitespace */", || {
                    let words: Vec<_> = "a  b c".split_whitespace().collect();
                    assert_eq!(words, ["a", "b", "c"]);
                })]
            }),
        ]
    })
}

fn main() -> ExitCode {
    let registry = SUITES
        .iter()
        .fold(Registry::new(), |registry, suite| {
            registry.with_suite(suite.path, suite.build)
        });
    cli::main(registry)
}
