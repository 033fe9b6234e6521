//! Descriptions derived from documentation text.
//!
//! Definitions and leaves carry the raw documentation they were declared with,
//! for example a block comment like
//!
//! ```text
//! /**
//!  * Parsing should reject trailing commas.
//!  * @issue 12
//!  */
//! ```
//!
//! Before anything is printed, that text is reduced to a single line. Comment
//! markers and per line decoration are dropped, annotation lines (lines starting
//! with `@`) are removed since they are meant for tooling, and all whitespace is
//! collapsed.

use std::sync::LazyLock;

use regex::Regex;

static OPENING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*/\*[*!]?").unwrap());

static CLOSING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*/\s*$").unwrap());

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:\*+|///?|//!)?[ \t]*@\w+.*$").unwrap());

static DECORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:\*+|///?|//!)").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Reduce documentation text to a single line description.
///
/// Empty input yields an empty string.
pub fn describe(doc: &str) -> String {
    let doc = OPENING.replace(doc, "");
    let doc = CLOSING.replace(&doc, "");
    let doc = ANNOTATION.replace_all(&doc, "");
    let doc = DECORATION.replace_all(&doc, "");
    let doc = doc.replace(['\r', '\n'], " ");
    WHITESPACE.replace_all(&doc, " ").trim().to_string()
}
