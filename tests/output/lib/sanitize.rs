use std::sync::LazyLock;

use regex::Regex;

static OVERWRITTEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Matches everything on a line up to the last `ESC[<n>D ESC[0m`, the part a
    // terminal would have overwritten.
    Regex::new(r"(?m)^[^\n]*\x1b\[\d+D\x1b\[0m").unwrap()
});

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"on line \d+").unwrap());

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Took \d+\.\d{2} seconds").unwrap());

pub fn sanitize_output(input: &str) -> String {
    // 1. Keep only what ends up on screen
    let tmp = OVERWRITTEN_RE.replace_all(input, "");

    // 2. Line numbers move whenever the suites are edited
    let tmp = LINE_RE.replace_all(tmp.as_ref(), "on line <line>");

    // 3. Timing
    let tmp = DURATION_RE.replace_all(tmp.as_ref(), "Took <duration> seconds");

    tmp.replace('\\', "/")
}
