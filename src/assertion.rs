//! Assertion macros that mark their panics as assertion failures.
//!
//! The std `assert!` family works too, its panics are recognized by their
//! message. The macros here additionally carry the exact call site, so the
//! failure is attributed to the asserting line even when the panic hook is not
//! installed.

use std::panic::{self, Location};

use crate::stack::SourceLocation;

/// Panic payload raised by this crate's assertion macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailed {
    pub message: String,
    pub location: SourceLocation,
}

#[doc(hidden)]
#[track_caller]
pub fn fail(message: String) -> ! {
    let location = SourceLocation::from(Location::caller());
    panic::panic_any(AssertionFailed { message, location })
}

#[macro_export]
macro_rules! assert {
    ($cond:expr $(,)?) => {
        if !$cond {
            $crate::assertion::fail(::std::format!(
                "assertion failed: {}",
                ::std::stringify!($cond)
            ));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::assertion::fail(::std::format!($($arg)+));
        }
    };
}

#[macro_export]
macro_rules! assert_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    $crate::assertion::fail(::std::format!(
                        "assertion `left == right` failed\n  left: {:?}\n right: {:?}",
                        left,
                        right
                    ));
                }
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    $crate::assertion::fail(::std::format!(
                        "assertion `left == right` failed: {}\n  left: {:?}\n right: {:?}",
                        ::std::format_args!($($arg)+),
                        left,
                        right
                    ));
                }
            }
        }
    };
}

#[macro_export]
macro_rules! assert_ne {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if *left == *right {
                    $crate::assertion::fail(::std::format!(
                        "assertion `left != right` failed\n  left: {:?}\n right: {:?}",
                        left,
                        right
                    ));
                }
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => {
                if *left == *right {
                    $crate::assertion::fail(::std::format!(
                        "assertion `left != right` failed: {}\n  left: {:?}\n right: {:?}",
                        ::std::format_args!($($arg)+),
                        left,
                        right
                    ));
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::panic::catch_unwind;

    use super::*;

    fn raised(f: impl FnOnce() + panic::UnwindSafe) -> AssertionFailed {
        let _guard = crate::capture::WatchGuard::enter(true);
        let payload = catch_unwind(f).expect_err("assertion should fail");
        *payload
            .downcast::<AssertionFailed>()
            .expect("payload should be an assertion")
    }

    #[test]
    fn assert_reports_the_expression_and_line() {
        let line = line!() + 1;
        let failed = raised(|| crate::assert!(1 + 1 == 3));
        assert_eq!(failed.message, "assertion failed: 1 + 1 == 3");
        assert_eq!(failed.location.line, line);
        assert!(failed.location.file.ends_with("assertion.rs"));
    }

    #[test]
    fn custom_messages_are_kept() {
        let failed = raised(|| crate::assert!(false, "custom {}", 7));
        assert_eq!(failed.message, "custom 7");
    }

    #[test]
    fn assert_eq_shows_both_sides() {
        let failed = raised(|| crate::assert_eq!(1, 2));
        assert_eq!(
            failed.message,
            "assertion `left == right` failed\n  left: 1\n right: 2"
        );
    }

    #[test]
    fn passing_assertions_do_nothing() {
        crate::assert!(true);
        crate::assert_eq!("a", "a");
        crate::assert_ne!(1, 2, "never shown");
    }
}
