//! autocpp: documentation written once, in the header.
//!
//! `/** ... */` comments are scanned out of a C++ header together with the
//! declaration that follows each of them, keyed by a canonical signature,
//! and handed back to a document that names the same declaration, however
//! it happens to be spaced.
//!
//! ```no_run
//! use autocpp::{resolve, BuildContext, Config, Directive, StderrReporter};
//!
//! let config = Config {
//!     input: Some("include/api.h".into()),
//!     macros: vec!["API=".to_string()],
//! };
//! let ctx = BuildContext::new(config, ".");
//! let item = resolve(&ctx, Directive::Function, "fun(int& a)", &StderrReporter)?;
//! println!("{}", item.signature);
//! # Ok::<(), autocpp::Error>(())
//! ```

pub mod classify;
pub mod config;
pub mod cpp;
pub mod diagnostic;
pub mod error;
pub mod lookup;
pub mod macros;
pub mod normalize;
pub mod scanner;
pub mod table;

pub use classify::{classify, Classified, EntityKind};
pub use config::Config;
pub use cpp::{CppDeclarationParser, DeclarationParser, ParsedDeclaration};
pub use diagnostic::{CollectingReporter, Diagnostic, Reporter, StderrReporter};
pub use error::{ConfigError, Error, ParseError, Result};
pub use lookup::{lookup, resolve, Directive, LookupResult, ResolvedItem};
pub use macros::{MacroDefinition, MacroTable};
pub use normalize::normalize;
pub use scanner::{CommentScanner, RawPair};
pub use table::{ApidocTable, BuildContext, DocEntry, FsLoader, SourceLoader};
