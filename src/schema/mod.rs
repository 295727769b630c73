//! Versioned schema tables and their load-once cache.
//!
//! The byte layout of an SWT file is not hard-coded. Each part of the file
//! (header, player card, team card, pairings, ...) is described by a table
//! in [`table`] form, fetched from a [`TableSource`].
//!
//! ## Version fallback
//! Tables can be overridden per format version. For version `261` the
//! resolver tries these variants in order and uses the first that defines
//! the requested part:
//! ```text
//! structure-v261/
//! structure-v26x/
//! structure-v2xx/
//! structure/
//! ```
//!
//! ## Caching
//! Every table is loaded at most once per resolver and shared as an
//! [`Arc`]. The caches are safe to populate from several threads at once.
//! Failed loads are not cached.

pub mod source;
pub mod table;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub use source::{DirSource, MemorySource, TableSource};
pub use table::{ConstantTable, FieldDescriptor, FieldTable, SelectionTable};

use crate::{Error, Result};

type Cache<T> = RwLock<HashMap<String, Arc<T>>>;

/// Loads schema tables for one format version.
#[derive(Debug)]
pub struct SchemaResolver<S> {
    source: Arc<S>,
    variants: Vec<String>,
    fields: Cache<FieldTable>,
    selections: Cache<SelectionTable>,
    constants: Cache<ConstantTable>,
    names: Cache<SelectionTable>,
}

impl<S: TableSource> SchemaResolver<S> {
    /// Create a resolver for `version`, or for the default tables only if
    /// `version` is [`None`].
    pub fn new(source: Arc<S>, version: Option<u32>) -> Self {
        Self {
            source,
            variants: version_variants(version),
            fields: RwLock::default(),
            selections: RwLock::default(),
            constants: RwLock::default(),
            names: RwLock::default(),
        }
    }

    /// Candidate variants, most specific first.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Field table of `part`.
    pub fn fields(&self, part: &str) -> Result<Arc<FieldTable>> {
        memoized(&self.fields, part, || {
            let table = FieldTable::parse(part, &self.locate(part)?)?;
            log::trace!("schema part '{part}': {} fields", table.len());
            Ok(table)
        })
    }

    /// Selection table of `area` (e.g. `sex-selection`).
    pub fn selection(&self, area: &str) -> Result<Arc<SelectionTable>> {
        memoized(&self.selections, area, || {
            SelectionTable::parse(area, &self.locate(area)?)
        })
    }

    /// Constants table of `part`.
    pub fn constants(&self, part: &str) -> Result<Arc<ConstantTable>> {
        memoized(&self.constants, part, || {
            ConstantTable::parse(part, &self.locate(part)?)
        })
    }

    /// Field-name translations for `language` (e.g. `de`), code → name.
    ///
    /// These tables are shared by every format version, so no variant is
    /// tried.
    pub fn field_names(&self, language: &str) -> Result<Arc<SelectionTable>> {
        memoized(&self.names, language, || {
            let part = format!("field-names/{language}");
            let text = self
                .source
                .fetch_field_names(language)?
                .ok_or_else(|| Error::MissingTable(part.clone()))?;
            SelectionTable::parse_names(&part, &text)
        })
    }

    /// Text of `part` from the most specific variant that has it.
    fn locate(&self, part: &str) -> Result<String> {
        for variant in &self.variants {
            if let Some(text) = self.source.fetch(variant, part)? {
                log::debug!("schema part '{part}' from variant '{variant}'");
                return Ok(text);
            }
        }
        Err(Error::MissingTable(part.to_owned()))
    }
}

/// Directory suffixes tried for `version`, most specific first.
///
/// `261` yields `-v261`, `-v26x`, `-v2xx` and finally the empty default.
pub fn version_variants(version: Option<u32>) -> Vec<String> {
    let mut variants = Vec::new();
    if let Some(version) = version {
        let digits = version.to_string();
        for wild in 0..digits.len() {
            let kept = &digits[..digits.len() - wild];
            variants.push(format!("-v{kept}{}", "x".repeat(wild)));
        }
    }
    variants.push(String::new());
    variants
}

/// Read-through cache lookup. `load` runs at most once per key; concurrent
/// callers for the same key wait on the write lock and then see the result.
fn memoized<T>(cache: &Cache<T>, key: &str, load: impl FnOnce() -> Result<T>) -> Result<Arc<T>> {
    if let Some(hit) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
    {
        return Ok(Arc::clone(hit));
    }
    let mut map = cache.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(hit) = map.get(key) {
        return Ok(Arc::clone(hit));
    }
    let value = Arc::new(load()?);
    map.insert(key.to_owned(), Arc::clone(&value));
    Ok(value)
}
