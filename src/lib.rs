//! A depth-first runner for nested test suites.
//!
//! A test file declares a [`Definition`]: documentation, a path and a body
//! that yields [`Step`]s lazily. Steps are leaves, plain test functions, or
//! further suites. Suites register hooks on their [`Scope`] that run around
//! every leaf below them.
//!
//! ```
//! use nestest::{assert_eq, prelude::*};
//!
//! let math = Definition::new("/** Basic math */", "tests/math.rs", |scope: Scope| {
//!     scope.before_each(|| ());
//!     steps![
//!         leaf("adds", || assert_eq!(1 + 1, 2)),
//!         suite("division", |_| {
//!             steps![leaf("divides", || assert_eq!(4 / 2, 2))]
//!         }),
//!     ]
//! });
//!
//! let mut harness = nestest::Harness::new(nestest::HarnessConfig::new()).unwrap();
//! let counters = harness.run_definition(math);
//! assert_eq!(counters.passed, 2);
//! ```

pub mod assertion;
pub mod capture;
pub mod classify;
pub mod cli;
pub mod config;
pub mod definition;
pub mod describe;
pub mod discovery;
pub mod formatter;
pub mod hooks;
pub mod loader;
pub mod node;
pub mod stack;

mod error;
pub use error::*;

mod filter;
pub use filter::*;

mod harness;
pub use harness::*;

mod log;
pub use log::*;

mod report;
pub use report::*;

#[cfg(test)]
mod test_support;

pub use config::HarnessConfig;
pub use definition::{Definition, Exception, Leaf, Step, Steps, leaf, suite};
pub use describe::describe;
pub use hooks::Scope;
pub use loader::{LoadError, Loader, Registry};
pub use node::{Counters, TestNode};

/// Everything needed to declare suites.
///
/// The capturing [`assert!`](crate::assert), [`assert_eq!`](crate::assert_eq),
/// [`println!`](crate::println) and friends share their names with the std
/// prelude, a glob import would make them ambiguous.
/// Import the ones a test file uses by name:
///
/// ```
/// use nestest::{assert_eq, println, prelude::*};
///
/// let step = leaf("prints", || {
///     println!("captured");
///     assert_eq!(2 * 2, 4);
/// });
/// # drop(step);
/// ```
pub mod prelude {
    pub use crate::{Definition, Exception, Scope, Step, Steps, leaf, steps, suite};
}
