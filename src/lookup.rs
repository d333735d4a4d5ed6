//! Matching caller signatures against the table.

use crate::classify::EntityKind;
use crate::diagnostic::{Diagnostic, Reporter};
use crate::error::Result;
use crate::normalize::normalize;
use crate::table::{ApidocTable, BuildContext, DocEntry};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult<'a> {
    Found(&'a DocEntry),
    NotFound,
}

impl<'a> LookupResult<'a> {
    pub fn entry(self) -> Option<&'a DocEntry> {
        match self {
            LookupResult::Found(entry) => Some(entry),
            LookupResult::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupResult::Found(_))
    }
}

/// Function queries are normalized; class queries must match the canonical
/// form exactly.
pub fn lookup<'a>(table: &'a ApidocTable, kind: EntityKind, query: &str) -> LookupResult<'a> {
    let hit = match kind {
        EntityKind::Function => table.get(&normalize(query)),
        EntityKind::Class => table.get(query),
    };
    match hit {
        Some(entry) => LookupResult::Found(entry),
        None => LookupResult::NotFound,
    }
}

/// The two directives a document can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Function,
    Class,
}

impl Directive {
    pub fn name(self) -> &'static str {
        match self {
            Directive::Function => "autocppfunction",
            Directive::Class => "autocppclass",
        }
    }

    pub fn kind(self) -> EntityKind {
        match self {
            Directive::Function => EntityKind::Function,
            Directive::Class => EntityKind::Class,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Directive {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "autocppfunction" => Ok(Directive::Function),
            "autocppclass" => Ok(Directive::Class),
            _ => Err(format!(
                "unknown directive: {}. Use autocppfunction or autocppclass",
                s
            )),
        }
    }
}

/// What a directive ends up documenting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedItem {
    pub kind: EntityKind,
    /// The signature the document asked for.
    pub query: String,
    /// The signature to render: the header declaration on a hit, the query
    /// otherwise.
    pub signature: String,
    /// Canonical form of `signature`, if the declaration reader accepts it.
    pub rendered: Option<String>,
    /// Body lines; empty on a miss.
    pub content: Vec<String>,
    pub found: bool,
}

/// Resolve one directive against its context's table. A miss is reported as
/// `Declaration not found: <signature>` and falls back to the signature as
/// given. The final signature is run through the context's declaration
/// reader; a rejection is reported against the directive.
pub fn resolve(
    ctx: &BuildContext,
    directive: Directive,
    signature: &str,
    reporter: &dyn Reporter,
) -> Result<ResolvedItem> {
    let table = ctx.table(reporter)?;
    let kind = directive.kind();
    let (final_signature, content, found) = match lookup(table, kind, signature) {
        LookupResult::Found(entry) => (
            entry.declaration_text.clone(),
            entry.apidoc_lines.clone(),
            true,
        ),
        LookupResult::NotFound => {
            reporter.warning(Diagnostic::new(format!(
                "Declaration not found: {}",
                signature
            )));
            (signature.to_string(), Vec::new(), false)
        }
    };

    let rendered = match ctx.parser().parse(&final_signature, kind) {
        Ok(parsed) => Some(parsed.render()),
        Err(e) => {
            reporter.warning(Diagnostic::new(format!(
                "Error in \"{}\" directive: {}",
                directive, e.message
            )));
            None
        }
    };

    Ok(ResolvedItem {
        kind,
        query: signature.to_string(),
        signature: final_signature,
        rendered,
        content,
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cpp::CppDeclarationParser;
    use crate::diagnostic::CollectingReporter;
    use crate::macros::MacroTable;
    use crate::table::tests::{HEADER, MACROS};
    use crate::table::SourceLoader;
    use std::io;
    use std::path::{Path, PathBuf};

    fn header_table() -> ApidocTable {
        let macros = MacroTable::build(MACROS).unwrap();
        ApidocTable::build(
            HEADER,
            "test.h",
            &macros,
            &CppDeclarationParser,
            &CollectingReporter::new(),
        )
    }

    struct Fixed(&'static str);

    impl SourceLoader for Fixed {
        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn header_context() -> BuildContext {
        let config = Config {
            input: Some(PathBuf::from("test.h")),
            macros: MACROS.iter().map(|m| m.to_string()).collect(),
        };
        BuildContext::new(config, ".").with_loader(Fixed(HEADER))
    }

    #[test]
    fn function_found_by_short_signature() {
        let table = header_table();
        let entry = lookup(&table, EntityKind::Function, "fun()").entry().unwrap();
        assert!(entry.declaration_text.contains("void fun()"));
        assert_eq!(entry.apidoc_lines[0], "Function `fun` description");
    }

    #[test]
    fn function_query_spacing_is_normalized() {
        let table = header_table();
        for q in [
            "fun_ref(int& a, int &b)",
            "fun_ref(int &a, int& b)",
            "fun_ref(int & a, int & b)",
            "fun_ptr(int * a, int*b)",
            "fun_with_trailing_return() -> int",
            "fun_with_trailing_return()",
        ] {
            assert!(lookup(&table, EntityKind::Function, q).is_found(), "{}", q);
        }
    }

    #[test]
    fn class_requires_exact_key() {
        let mut table = ApidocTable::default();
        table.insert(
            "class cls",
            DocEntry {
                declaration_text: "class cls".to_string(),
                apidoc_lines: vec!["doc".to_string()],
            },
        );
        assert!(lookup(&table, EntityKind::Class, "class cls").is_found());
        assert_eq!(lookup(&table, EntityKind::Class, "class  cls"), LookupResult::NotFound);
        assert_eq!(lookup(&table, EntityKind::Class, "class cls "), LookupResult::NotFound);
    }

    #[test]
    fn miss_is_not_found() {
        let table = header_table();
        assert_eq!(lookup(&table, EntityKind::Function, "bad()"), LookupResult::NotFound);
        assert_eq!(lookup(&table, EntityKind::Class, "class cls"), LookupResult::NotFound);
        assert_eq!(lookup(&ApidocTable::default(), EntityKind::Function, "fun()"), LookupResult::NotFound);
    }

    #[test]
    fn resolve_hit_replaces_signature_and_content() {
        let ctx = header_context();
        let reporter = CollectingReporter::new();
        let item = resolve(&ctx, Directive::Function, "fun_ref(int&a, int&b)", &reporter).unwrap();
        assert!(item.found);
        assert_eq!(item.signature, "void fun_ref(int& a, int &b)");
        assert_eq!(item.rendered.as_deref(), Some("void fun_ref(int &a, int &b)"));
        assert_eq!(item.content, vec!["A function with reference parameters "]);
        // only the bad_decl warning from the build
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn resolve_miss_warns_and_keeps_signature() {
        let ctx = header_context();
        let reporter = CollectingReporter::new();
        let item = resolve(&ctx, Directive::Function, "bad()", &reporter).unwrap();
        assert!(!item.found);
        assert_eq!(item.signature, "bad()");
        assert!(item.content.is_empty());
        let last = reporter.diagnostics().pop().unwrap();
        assert_eq!(last.to_string(), "Declaration not found: bad()");
        assert_eq!(item.rendered.as_deref(), Some("bad()"));
    }

    #[test]
    fn resolve_reports_unparseable_signature() {
        let ctx = header_context();
        let reporter = CollectingReporter::new();
        let item = resolve(&ctx, Directive::Function, "bad_decl*()", &reporter).unwrap();
        assert!(!item.found);
        assert_eq!(item.rendered, None);
        let messages: Vec<String> = reporter.diagnostics().into_iter().map(|d| d.message).collect();
        assert!(messages.contains(&"Declaration not found: bad_decl*()".to_string()));
        assert!(messages
            .iter()
            .any(|m| m.starts_with("Error in \"autocppfunction\" directive: ")));
    }

    #[test]
    fn resolve_template_uses_header_declaration() {
        let ctx = header_context();
        let item = resolve(&ctx, Directive::Function, "fun_template(T)", &CollectingReporter::new()).unwrap();
        assert_eq!(item.signature, "template <typename T>\nvoid fun_template(T)");
        assert_eq!(
            item.rendered.as_deref(),
            Some("template<typename T> void fun_template(T)")
        );
    }

    #[test]
    fn resolve_class() {
        let ctx = header_context();
        let item = resolve(&ctx, Directive::Class, "cls", &CollectingReporter::new()).unwrap();
        assert!(item.found);
        assert_eq!(item.signature, "cls");
        assert_eq!(item.content, vec!["Class `cls` description "]);
    }

    #[test]
    fn directive_names() {
        assert_eq!("autocppfunction".parse::<Directive>(), Ok(Directive::Function));
        assert_eq!("autocppclass".parse::<Directive>(), Ok(Directive::Class));
        assert!("autocppmacro".parse::<Directive>().is_err());
        assert_eq!(Directive::Class.to_string(), "autocppclass");
        assert_eq!(Directive::Function.kind(), EntityKind::Function);
    }
}
