use std::{cell::Cell, process::ExitCode, rc::Rc};

use nestest::{HarnessConfig, Registry, assert, assert_eq, println, prelude::*};

fn cart() -> Definition {
    Definition::new("/**\n * Shopping cart\n * @group demo\n */", "", |scope: Scope| {
        let items = Rc::new(Cell::new(0));
        scope.before_each({
            let items = Rc::clone(&items);
            move || items.set(0)
        });

        let (add, remove) = (Rc::clone(&items), Rc::clone(&items));
        steps![
            leaf("/** Starts empty */", move || assert_eq!(items.get(), 0)),
            leaf("/** Adds an item */", move || {
                add.set(add.get() + 1);
                println!("cart has {} item(s)", add.get());
                assert_eq!(add.get(), 1);
            }),
            suite("/** Checkout */", move |_| {
                steps![
                    leaf("/** Rejects an empty cart */", move || {
                        assert!(remove.get() == 0, "cart should be empty after reset")
                    }),
                    leaf("/** Charges the card */", || -> Result<(), Exception> {
                        let total: u32 = "12x".parse()?;
                        assert_eq!(total, 12);
                        Ok(())
                    }),
                ]
            }),
        ]
    })
}

fn main() -> ExitCode {
    nestest::cli::init_tracing();
    let registry = Registry::new().with_suite("cart.rs", cart);
    let report = nestest::Harness::new(HarnessConfig::from_env())
        .map(|harness| harness.run_files(&registry, ["cart.rs"]));
    match report {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(err) => {
            std::eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
