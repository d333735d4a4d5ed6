//! Declaration reading.
//!
//! The table builder only needs two things from a grammar: accept or reject
//! a declaration, and print an accepted one in a canonical form. That seam
//! is [`DeclarationParser`]. [`CppDeclarationParser`] covers the function and
//! class declarations that show up in public headers; hosts with a complete
//! C++ front end can plug in their own.

mod parser;
pub mod token;

use crate::classify::EntityKind;
use crate::error::ParseError;

/// A declaration accepted by a [`DeclarationParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeclaration {
    pub kind: EntityKind,
    /// Canonical `template<...>` prefixes, outermost first.
    pub templates: Vec<String>,
    /// Return type and other decl-specifiers. Empty for classes,
    /// constructors and destructors.
    pub specifiers: String,
    /// Name plus everything that belongs to it: pointer/reference markers,
    /// parameter list, qualifiers and trailing return for functions; name,
    /// `final` and base list for classes.
    pub declarator: String,
}

impl ParsedDeclaration {
    /// Canonical rendering of the whole declaration.
    pub fn render(&self) -> String {
        let mut parts: Vec<&str> = self.templates.iter().map(String::as_str).collect();
        if !self.specifiers.is_empty() {
            parts.push(&self.specifiers);
        }
        parts.push(&self.declarator);
        parts.join(" ")
    }

    /// Canonical rendering of the declarator alone.
    pub fn render_declarator(&self) -> &str {
        &self.declarator
    }
}

/// Turns declaration text of a given kind into a [`ParsedDeclaration`].
pub trait DeclarationParser {
    fn parse(&self, text: &str, kind: EntityKind) -> Result<ParsedDeclaration, ParseError>;
}

/// Built-in reader for header-level C++ declarations.
#[derive(Debug, Default, Clone, Copy)]
pub struct CppDeclarationParser;

impl DeclarationParser for CppDeclarationParser {
    fn parse(&self, text: &str, kind: EntityKind) -> Result<ParsedDeclaration, ParseError> {
        let parsed = token::tokenize(text).and_then(|tokens| match kind {
            EntityKind::Function => parser::parse_function(&tokens),
            EntityKind::Class => parser::parse_class(&tokens),
        });
        parsed.map_err(|e| {
            let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
            ParseError::new(format!(
                "Invalid {} declaration: {} [error: {}]",
                kind, flat, e.message
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(text: &str) -> ParsedDeclaration {
        CppDeclarationParser
            .parse(text, EntityKind::Function)
            .unwrap()
    }

    #[test]
    fn renders_plain_function() {
        let decl = function("void fun()");
        assert_eq!(decl.render(), "void fun()");
        assert_eq!(decl.render_declarator(), "fun()");
    }

    #[test]
    fn renders_template_function() {
        let decl = function("template <typename T>\nvoid fun_template(T)");
        assert_eq!(decl.render(), "template<typename T> void fun_template(T)");
        assert_eq!(decl.render_declarator(), "fun_template(T)");
    }

    #[test]
    fn renders_reference_parameters() {
        let decl = function("void fun_ref(int& a, int &b)");
        assert_eq!(decl.render(), "void fun_ref(int &a, int &b)");
    }

    #[test]
    fn renders_class() {
        let decl = CppDeclarationParser
            .parse("cls ", EntityKind::Class)
            .unwrap();
        assert_eq!(decl.render(), "cls");
        assert_eq!(decl.kind, EntityKind::Class);
    }

    #[test]
    fn rejects_garbage() {
        let err = CppDeclarationParser
            .parse("bad_decl*()", EntityKind::Function)
            .unwrap_err();
        assert!(err.message.starts_with("Invalid function declaration: bad_decl*()"));
        assert!(err.message.contains("'*'"));
    }
}
