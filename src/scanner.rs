//! Doc comment scanner: pairs each `/** ... */` block with the declaration
//! that follows it.
//!
//! The scan is a plain loop over the buffer: find the opener, find the
//! closer, skip whitespace, then take everything up to the first `;` or `{`.
//! Line numbers are tracked incrementally so diagnostics point at the
//! declaration even though the loop jumps around the buffer.

use regex::Regex;
use std::sync::LazyLock;

const OPENER: &str = "/**";
const CLOSER: &str = "*/";

// String and char literals are matched first so a `//` inside them survives.
static RE_LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|//[^\n]*"#).unwrap()
});

/// One doc comment and the declaration text after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPair {
    /// Text between `/**` and `*/`, untouched.
    pub comment_body: String,
    /// Declaration text with `//` comments removed, not yet trimmed.
    pub declaration_text: String,
    /// Byte offset of the declaration in the source.
    pub start_offset: usize,
    /// 1-based line of the declaration start.
    pub line: usize,
}

impl RawPair {
    /// The comment body as directive content lines.
    pub fn apidoc_lines(&self) -> Vec<String> {
        dedent(self.comment_body.trim_start_matches('\n'))
    }
}

/// Iterator over the doc comment / declaration pairs of a source buffer.
pub struct CommentScanner<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    counted_to: usize,
}

impl<'a> CommentScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            counted_to: 0,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        self.line += self.source[self.counted_to..offset]
            .bytes()
            .filter(|&b| b == b'\n')
            .count();
        self.counted_to = offset;
        self.line
    }

    fn finish(&mut self) -> Option<RawPair> {
        self.pos = self.source.len();
        None
    }
}

impl Iterator for CommentScanner<'_> {
    type Item = RawPair;

    fn next(&mut self) -> Option<RawPair> {
        let src = self.source;

        let Some(open) = find_from(src, self.pos, OPENER) else {
            return self.finish();
        };
        let body_start = open + OPENER.len();
        let Some(close) = find_from(src, body_start, CLOSER) else {
            return self.finish();
        };

        let after_comment = &src[close + CLOSER.len()..];
        let decl_start = src.len() - after_comment.trim_start().len();
        let Some(term) = src[decl_start..].find([';', '{']).map(|i| decl_start + i) else {
            return self.finish();
        };

        self.pos = term + 1;
        let line = self.line_at(decl_start);

        Some(RawPair {
            comment_body: src[body_start..close].to_string(),
            declaration_text: strip_line_comments(&src[decl_start..term]),
            start_offset: decl_start,
            line,
        })
    }
}

fn find_from(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    haystack[from..].find(needle).map(|i| from + i)
}

/// Remove `//` comments up to end of line, keeping the newline. Literals
/// are left alone.
pub fn strip_line_comments(text: &str) -> String {
    RE_LINE_COMMENT
        .replace_all(text, |caps: &regex::Captures| {
            let m = &caps[0];
            if m.starts_with("//") {
                String::new()
            } else {
                m.to_string()
            }
        })
        .into_owned()
}

/// Remove common leading indentation and split into lines. Lines holding
/// only spaces/tabs become empty and do not count towards the margin.
pub fn dedent(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.split('\n').collect();

    let mut margin: Option<&str> = None;
    for line in &lines {
        if line.trim_matches([' ', '\t']).is_empty() {
            continue;
        }
        let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
        let indent = &line[..indent_len];
        margin = Some(match margin {
            None => indent,
            Some(m) => common_prefix(m, indent),
        });
    }
    let margin = margin.unwrap_or("");

    lines
        .into_iter()
        .map(|line| {
            if line.trim_matches([' ', '\t']).is_empty() {
                String::new()
            } else {
                line[margin.len()..].to_string()
            }
        })
        .collect()
}

fn common_prefix<'s>(a: &'s str, b: &str) -> &'s str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}
