//! The apidoc table: canonical signature key → documentation entry.
//!
//! A table is built from one header per [`BuildContext`] and cached there,
//! so documenting many entities from the same header scans it once.

use crate::classify::{classify, EntityKind};
use crate::config::Config;
use crate::cpp::{CppDeclarationParser, DeclarationParser};
use crate::diagnostic::{Diagnostic, Reporter};
use crate::error::{Error, Result};
use crate::macros::MacroTable;
use crate::normalize::normalize;
use crate::scanner::CommentScanner;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Documentation for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocEntry {
    /// Declaration as written in the header, after macro substitution.
    pub declaration_text: String,
    /// Comment body, dedented, one element per line.
    pub apidoc_lines: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ApidocTable {
    entries: HashMap<String, DocEntry>,
}

impl ApidocTable {
    /// Scan `source` and collect every documented declaration the parser
    /// accepts. Rejected declarations are reported against `file_name` and
    /// skipped.
    pub fn build(
        source: &str,
        file_name: &str,
        macros: &MacroTable,
        parser: &dyn DeclarationParser,
        reporter: &dyn Reporter,
    ) -> Self {
        let mut table = Self::default();

        for pair in CommentScanner::new(source) {
            let decl = macros.substitute(&pair.declaration_text);
            let classified = classify(decl.trim());

            let parsed = match parser.parse(&classified.text, classified.kind) {
                Ok(parsed) => parsed,
                Err(e) => {
                    reporter.warning(Diagnostic::at(file_name, pair.line, e.message));
                    continue;
                }
            };

            let key = match classified.kind {
                EntityKind::Function => normalize(parsed.render_declarator()),
                EntityKind::Class => parsed.render(),
            };
            debug!(key = %key, line = pair.line, offset = pair.start_offset, "apidoc");
            let entry = DocEntry {
                declaration_text: classified.text.trim().to_string(),
                apidoc_lines: pair.apidoc_lines(),
            };
            table.insert(key, entry);
        }

        table
    }

    /// Insert an entry; a later entry under the same key replaces the
    /// earlier one.
    pub fn insert(&mut self, key: impl Into<String>, entry: DocEntry) {
        let key = key.into();
        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            debug!(
                key = %key,
                replaced = %previous.declaration_text,
                "duplicate apidoc key, keeping the later declaration"
            );
        }
    }

    pub fn get(&self, key: &str) -> Option<&DocEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Where header text comes from.
pub trait SourceLoader {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// One documentation build: its configuration and, once asked for, its
/// table. Contexts share nothing; each builds its own table.
pub struct BuildContext {
    config: Config,
    source_root: PathBuf,
    parser: Box<dyn DeclarationParser>,
    loader: Box<dyn SourceLoader>,
    table: OnceCell<ApidocTable>,
}

impl BuildContext {
    pub fn new(config: Config, source_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            source_root: source_root.into(),
            parser: Box::new(CppDeclarationParser),
            loader: Box::new(FsLoader),
            table: OnceCell::new(),
        }
    }

    pub fn with_parser(mut self, parser: impl DeclarationParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn parser(&self) -> &dyn DeclarationParser {
        self.parser.as_ref()
    }

    /// Whether the table has been built yet.
    pub fn is_built(&self) -> bool {
        self.table.get().is_some()
    }

    /// The table for this context, built on first use.
    pub fn table(&self, reporter: &dyn Reporter) -> Result<&ApidocTable> {
        self.table.get_or_try_init(|| self.build_table(reporter))
    }

    fn build_table(&self, reporter: &dyn Reporter) -> Result<ApidocTable> {
        let macros = MacroTable::build(self.config.macros.as_slice())?;

        let Some(path) = self.config.input_path(&self.source_root) else {
            debug!("no input configured, apidoc table is empty");
            return Ok(ApidocTable::default());
        };

        let source = self
            .loader
            .read_to_string(&path)
            .map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;

        let file_name = path.display().to_string();
        let table = ApidocTable::build(
            &source,
            &file_name,
            &macros,
            self.parser.as_ref(),
            reporter,
        );
        debug!(file = %file_name, entries = table.len(), "built apidoc table");
        Ok(table)
    }
}
