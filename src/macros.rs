//! Macro substitution applied to declarations before they are parsed.
//!
//! Headers often decorate declarations with export or attribute macros
//! (`API void f(NOEXCEPT(...))`) that a declaration reader cannot know about.
//! Each configured definition `NAME=replacement` or `NAME(args)=replacement`
//! turns every `NAME` (optionally followed by a flat `(...)` list) into its
//! replacement text.

use crate::error::ConfigError;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

/// One parsed `name(params)=replacement` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    /// `Some` when the definition carried a `(...)` marker.
    pub params: Option<Vec<String>>,
    pub replacement: String,
}

impl MacroDefinition {
    /// Parse a single configuration entry.
    pub fn parse(definition: &str) -> Result<Self, ConfigError> {
        let malformed = || ConfigError::MalformedMacro(definition.to_string());

        let head_end = definition.find(['(', '=']).ok_or_else(malformed)?;
        let name = definition[..head_end].trim();
        if name.is_empty() {
            return Err(malformed());
        }

        let mut rest = &definition[head_end..];
        let mut params = None;
        if let Some(after_open) = rest.strip_prefix('(') {
            let close = after_open.find(')').ok_or_else(malformed)?;
            let inner = after_open[..close].trim();
            params = Some(if inner.is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(|p| p.trim().to_string()).collect()
            });
            rest = after_open[close + 1..].trim_start();
        }

        let replacement = rest.strip_prefix('=').ok_or_else(malformed)?;
        Ok(Self {
            name: name.to_string(),
            params,
            replacement: replacement.to_string(),
        })
    }

    /// Replacement text for one invocation. `args` is the raw text between
    /// the parentheses, if the invocation had any.
    fn expand(&self, args: Option<&str>) -> String {
        let (Some(params), Some(args)) = (&self.params, args) else {
            return self.replacement.clone();
        };
        let args: Vec<&str> = if args.trim().is_empty() {
            Vec::new()
        } else {
            args.split(',').map(str::trim).collect()
        };
        if params.is_empty() || params.len() != args.len() {
            return self.replacement.clone();
        }
        RE_IDENT
            .replace_all(&self.replacement, |caps: &Captures| {
                let ident = &caps[0];
                match params.iter().position(|p| p == ident) {
                    Some(i) => args[i].to_string(),
                    None => ident.to_string(),
                }
            })
            .into_owned()
    }
}

/// Compiled set of macro definitions.
#[derive(Debug, Default)]
pub struct MacroTable {
    definitions: Vec<MacroDefinition>,
    matcher: Option<Regex>,
}

impl MacroTable {
    /// Compile configuration entries into a single alternation matcher.
    pub fn build<S: AsRef<str>>(definitions: &[S]) -> Result<Self, ConfigError> {
        let mut parsed: Vec<MacroDefinition> = Vec::new();
        for raw in definitions {
            let def = MacroDefinition::parse(raw.as_ref())?;
            match parsed.iter_mut().find(|d| d.name == def.name) {
                Some(existing) => *existing = def,
                None => parsed.push(def),
            }
        }

        if parsed.is_empty() {
            return Ok(Self::default());
        }

        let names: Vec<String> = parsed.iter().map(|d| regex::escape(&d.name)).collect();
        let pattern = format!(r"({})(\([^()]*\))?", names.join("|"));
        let matcher = Regex::new(&pattern)
            .map_err(|e| ConfigError::MalformedMacro(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            definitions: parsed,
            matcher: Some(matcher),
        })
    }

    pub fn definitions(&self) -> &[MacroDefinition] {
        &self.definitions
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Replace every macro invocation in `text`. One pass, replacement text
    /// is not rescanned.
    pub fn substitute(&self, text: &str) -> String {
        let Some(matcher) = &self.matcher else {
            return text.to_string();
        };
        matcher
            .replace_all(text, |caps: &Captures| {
                let name = &caps[1];
                let args = caps
                    .get(2)
                    .map(|m| &m.as_str()[1..m.as_str().len() - 1]);
                match self.definitions.iter().find(|d| d.name == name) {
                    Some(def) => def.expand(args),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_definition() {
        let def = MacroDefinition::parse("API=").unwrap();
        assert_eq!(def.name, "API");
        assert_eq!(def.params, None);
        assert_eq!(def.replacement, "");
    }

    #[test]
    fn parse_definition_with_params() {
        let def = MacroDefinition::parse("FOO(x, y)=x + y").unwrap();
        assert_eq!(def.name, "FOO");
        assert_eq!(def.params, Some(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(def.replacement, "x + y");
    }

    #[test]
    fn parse_keeps_equals_in_replacement() {
        let def = MacroDefinition::parse("DEFAULT=int x = 0").unwrap();
        assert_eq!(def.name, "DEFAULT");
        assert_eq!(def.replacement, "int x = 0");
    }

    #[test]
    fn missing_separator_is_config_error() {
        let err = MacroTable::build(&["NOPE"]).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedMacro(ref s) if s == "NOPE"));
        assert!(MacroTable::build(&["F(x) int"]).is_err());
        assert!(MacroTable::build(&["=int"]).is_err());
    }

    #[test]
    fn empty_table_is_identity() {
        let table = MacroTable::build::<&str>(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.substitute("void f(int)"), "void f(int)");
    }

    #[test]
    fn substitutes_name_and_arguments() {
        let table = MacroTable::build(&["MACRO1=", "MACRO2()=int"]).unwrap();
        assert_eq!(
            table.substitute("void fun_with_macro MACRO1 (MACRO2())"),
            "void fun_with_macro  (int)"
        );
    }

    #[test]
    fn parameters_take_invocation_arguments() {
        let table = MacroTable::build(&["FOO(x)=int x"]).unwrap();
        assert_eq!(table.substitute("void g(FOO(n))"), "void g(int n)");
    }

    #[test]
    fn arity_mismatch_inserts_replacement_verbatim() {
        let table = MacroTable::build(&["FOO(x)=int x"]).unwrap();
        assert_eq!(table.substitute("void g(FOO(a, b))"), "void g(int x)");
    }

    #[test]
    fn replacement_is_not_rescanned() {
        let table = MacroTable::build(&["A=B", "B=C"]).unwrap();
        assert_eq!(table.substitute("A B"), "B C");
    }

    #[test]
    fn later_definition_wins() {
        let table = MacroTable::build(&["API=first", "API=second"]).unwrap();
        assert_eq!(table.definitions().len(), 1);
        assert_eq!(table.substitute("API"), "second");
    }

    #[test]
    fn names_are_matched_literally() {
        let table = MacroTable::build(&["A.B=x"]).unwrap();
        assert_eq!(table.substitute("AxB A.B"), "AxB x");
    }
}
