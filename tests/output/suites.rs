use std::{cell::Cell, error::Error, fmt, rc::Rc};

use nestest::{assert, assert_eq, assert_ne, println, prelude::*};

pub fn basic() -> Definition {
    Definition::new(
        "/**\n * Basic test running\n * @group smoke\n */",
        "",
        |_| {
            steps![
                leaf("/** Adds numbers */", || assert_eq!(1 + 1, 2)),
                leaf("/** Prints while passing */", || {
                    println!("hello from a test")
                }),
                suite("/** Nested suite */", |_| {
                    steps![leaf("/** Compares strings */", || assert_ne!("a", "b"))]
                }),
            ]
        },
    )
}

#[derive(Debug)]
pub struct Timeout;

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("took too long")
    }
}

impl Error for Timeout {}

fn wait() -> Result<(), Timeout> {
    Err(Timeout)
}

pub fn failing() -> Definition {
    Definition::new("/** Failing tests */", "", |_| {
        steps![
            leaf("/** Asserts */", || assert!(1 + 1 == 3)),
            leaf("/** Unwraps nothing */", || {
                let empty: Option<u8> = None;
                let _ = empty.unwrap();
            }),
            leaf("/** Waits */", || -> Result<(), Exception> {
                wait()?;
                Ok(())
            }),
            leaf("/** Prints before failing */", || {
                println!("state = 3");
                assert_eq!(3, 4);
            }),
        ]
    })
}

/// A suite counting how often its hooks run.
pub fn hooks(before: Rc<Cell<usize>>, after: Rc<Cell<usize>>) -> Definition {
    Definition::new("/** Hooks */", "", move |scope: Scope| {
        scope.before_each(move || before.set(before.get() + 1));
        scope.after_each(move || after.set(after.get() + 1));
        steps![
            leaf("/** First */", || ()),
            suite("/** Inner */", |_| {
                steps![
                    leaf("/** Second */", || ()),
                    leaf("/** Third */", || assert!(false, "third fails")),
                ]
            }),
        ]
    })
}
