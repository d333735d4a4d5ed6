//! Build configuration: which header to scan and which macros to expand.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! input = "include/api.h"
//! macros = ["API=", "NOEXCEPT(x)=noexcept(x)"]
//! ```
//!
//! `input` is relative to the source root, which defaults to the directory
//! holding the config file.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "autocpp.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Header to scan, relative to the source root. No input means an
    /// empty table.
    pub input: Option<PathBuf>,
    /// `name(args)=replacement` entries.
    pub macros: Vec<String>,
}

impl Config {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Full path of the input under `source_root`.
    pub fn input_path(&self, source_root: &Path) -> Option<PathBuf> {
        self.input.as_ref().map(|p| source_root.join(p))
    }
}
