//! Tokenizer and canonical token printer for declaration text.

use crate::error::ParseError;
use std::fmt;

/// Punctuation recognized as a single token, longest first.
const MULTI_PUNCT: &[&str] = &["...", "::", "->", "&&", "||", "==", "!=", "<=", "++", "--"];

/// Operators that get a space on both sides when printed.
const SPACED_OPS: &[&str] = &[
    "=", "->", "==", "!=", "<=", "||", "+", "-", "/", "%", "|", "^", "?", ":",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Number(String),
    Literal(String),
    Punct(String),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Literal(s) | Token::Punct(s) => s,
        }
    }

    /// Identifiers, numbers and literals.
    pub fn is_word(&self) -> bool {
        !matches!(self, Token::Punct(_))
    }

    pub fn is_ident(&self) -> bool {
        matches!(self, Token::Ident(_))
    }

    pub fn is(&self, text: &str) -> bool {
        self.text() == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Split declaration text into tokens. Whitespace is dropped.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        // A sign directly in front of a digit belongs to the number unless the
        // previous token could end an operand (`a - 1`).
        let signed = (c == '-' || c == '+')
            && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())
            && !tokens.last().is_some_and(|t| t.is_word() || t.is(")") || t.is("]"));
        if c.is_ascii_digit() || signed {
            let start = i;
            i += 1;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '.' || chars[i] == '\'')
            {
                i += 1;
            }
            tokens.push(Token::Number(chars[start..i].iter().collect()));
            continue;
        }

        if c == '"' || c == '\'' {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i] != c {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            if i >= chars.len() {
                return Err(ParseError::new(format!(
                    "unterminated literal starting at {}",
                    chars[start..].iter().collect::<String>()
                )));
            }
            i += 1;
            tokens.push(Token::Literal(chars[start..i].iter().collect()));
            continue;
        }

        let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
        if let Some(p) = MULTI_PUNCT.iter().find(|p| rest.starts_with(**p)) {
            tokens.push(Token::Punct(p.to_string()));
            i += p.chars().count();
            continue;
        }

        if "()[]{}<>,;:*&~!=+-/%|^?.".contains(c) {
            tokens.push(Token::Punct(c.to_string()));
            i += 1;
            continue;
        }

        return Err(ParseError::new(format!(
            "unexpected character '{}' in declaration",
            c
        )));
    }

    Ok(tokens)
}

fn is_marker(t: &Token) -> bool {
    t.is("*") || t.is("&") || t.is("&&")
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    let (p, n) = (prev.text(), next.text());

    if matches!(p, "(" | "[" | "<" | "::" | "~" | "!") {
        return false;
    }
    if p == "," {
        return true;
    }
    if matches!(n, "," | ")" | "]" | ">" | "::" | "..." | ";") {
        return false;
    }
    if SPACED_OPS.contains(&p) || SPACED_OPS.contains(&n) {
        return true;
    }
    if matches!(n, "(" | "[") {
        return !(prev.is_word() || matches!(p, ")" | ">" | "]"));
    }
    if n == "<" {
        return false;
    }
    if is_marker(next) {
        return prev.is_word() || matches!(p, ">" | ")" | "]" | "...");
    }
    if is_marker(prev) {
        return false;
    }
    true
}

/// Print tokens in canonical spacing: single spaces between words, none
/// inside brackets, `, ` between items and `&`/`*` attached to what follows.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for t in tokens {
        if let Some(p) = prev {
            if needs_space(p, t) {
                out.push(' ');
            }
        }
        out.push_str(t.text());
        prev = Some(t);
    }
    out
}
