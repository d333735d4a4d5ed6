//! Class vs function detection on raw declaration text.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static RE_CLASS_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bclass\s+").unwrap());

/// What kind of entity a declaration or directive describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Function,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Class => f.write_str("class"),
            EntityKind::Function => f.write_str("function"),
        }
    }
}

/// Declaration text with its kind decided and the `class` marker removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: EntityKind,
    pub text: String,
}

/// Any `class` keyword makes the declaration a class; all of them are
/// removed before the text goes to the declaration reader.
pub fn classify(declaration: &str) -> Classified {
    if RE_CLASS_KEYWORD.is_match(declaration) {
        Classified {
            kind: EntityKind::Class,
            text: RE_CLASS_KEYWORD.replace_all(declaration, "").into_owned(),
        }
    } else {
        Classified {
            kind: EntityKind::Function,
            text: declaration.to_string(),
        }
    }
}
