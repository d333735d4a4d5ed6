//! Signature normalization for table keys and queries.

use regex::Regex;
use std::sync::LazyLock;

static RE_MARKER_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([&*])\s*").unwrap());

static RE_TRAILING_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\s*->.*").unwrap());

/// Normalize a function signature for matching.
///
/// `int &a`, `int& a` and `int & a` all become `int&a` (likewise for `*`),
/// and a trailing `-> type` is dropped so `auto f() -> int` matches `auto f()`.
/// Idempotent.
pub fn normalize(signature: &str) -> String {
    let collapsed = RE_MARKER_SPACE.replace_all(signature, "$1");
    let stripped = RE_TRAILING_RETURN.replace(&collapsed, "");
    stripped.trim().to_string()
}
