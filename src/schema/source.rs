//! Where schema table text comes from.
//!
//! A source only answers "what is the text of `part` in `variant`?". Version
//! fallback and caching live in [`super::SchemaResolver`].
//!
//! ```text
//! <root>/structure/<part>.csv            default tables
//! <root>/structure-v26x/<part>.csv       per-version overrides
//! <root>/field-names/<language>.csv      display names, not versioned
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::Result;

/// Provider of raw schema table text.
///
/// `variant` is a directory suffix such as `-v261`, `-v26x` or the empty
/// string for the default tables.
pub trait TableSource: Send + Sync {
    /// Text of the table, or [`None`] if this variant does not define it.
    fn fetch(&self, variant: &str, part: &str) -> Result<Option<String>>;

    /// Text of the field-name table for `language`. These tables sit beside
    /// the versioned ones and have no variants.
    fn fetch_field_names(&self, _language: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Tables stored as `<root>/structure<variant>/<part>.csv`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path a table would have for the given variant.
    pub fn path(&self, variant: &str, part: &str) -> PathBuf {
        self.root
            .join(format!("structure{variant}"))
            .join(format!("{part}.csv"))
    }

    /// Path of the field-name table for `language`.
    pub fn field_names_path(&self, language: &str) -> PathBuf {
        self.root.join("field-names").join(format!("{language}.csv"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn read_table(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(text(bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl TableSource for DirSource {
    fn fetch(&self, variant: &str, part: &str) -> Result<Option<String>> {
        read_table(&self.path(variant, part))
    }

    fn fetch_field_names(&self, language: &str) -> Result<Option<String>> {
        read_table(&self.field_names_path(language))
    }
}

/// Tables held in memory, keyed by variant and part.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<(String, String), String>,
    field_names: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table.
    pub fn insert(&mut self, variant: &str, part: &str, text: impl Into<String>) {
        self.tables
            .insert((variant.to_owned(), part.to_owned()), text.into());
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with(mut self, variant: &str, part: &str, text: impl Into<String>) -> Self {
        self.insert(variant, part, text);
        self
    }

    /// Add or replace the field-name table of `language`.
    pub fn with_field_names(mut self, language: &str, text: impl Into<String>) -> Self {
        self.field_names.insert(language.to_owned(), text.into());
        self
    }
}

impl TableSource for MemorySource {
    fn fetch(&self, variant: &str, part: &str) -> Result<Option<String>> {
        Ok(self
            .tables
            .get(&(variant.to_owned(), part.to_owned()))
            .cloned())
    }

    fn fetch_field_names(&self, language: &str) -> Result<Option<String>> {
        Ok(self.field_names.get(language).cloned())
    }
}

/// Table files are UTF-8 or, for older deployments, ISO-8859-1.
fn text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}
