//! Schema table types and their tab-separated text form.
//!
//! ## Field table (4 columns)
//! ```text
//! # comment lines start with '#'
//! <begin hex>  <end hex, optional>  <type tag>  <label, optional>
//! ```
//! A missing label becomes `BIN <begin>[-<end>]`.
//!
//! ## Selection / field-name tables (2 columns)
//! ```text
//! <key>  <replacement>
//! ```
//!
//! ## Constants table
//! `<name>  <decimal value>`; rows whose name does not start with a word
//! character are ignored.
//!
//! Trailing whitespace (including empty trailing columns) is ignored and
//! the last column may be left out entirely. Any other column count
//! is a configuration error reported with its line number.

use std::collections::HashMap;

use crate::fields::FieldKey;
use crate::utils::parse_hex_offset;
use crate::value::TypeTag;
use crate::{Error, Result};

/// One schema row: an inclusive byte range, how to decode it, and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// First byte, relative to the region window.
    pub begin: usize,
    /// Last byte (inclusive). Equal to `begin` for single-byte fields.
    pub end: usize,
    /// Raw type tag as written in the table.
    pub tag: String,
    /// Decoder selected by `tag`.
    pub kind: TypeTag,
    /// Output label.
    pub label: String,
}

/// Ordered field descriptors of one schema part.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl FieldTable {
    /// Parse a field table from its text form.
    pub fn parse(part: &str, text: &str) -> Result<Self> {
        let mut table = Self::default();
        for (row, cols) in rows(part, text, 4)? {
            let malformed = |reason| Error::MalformedRow {
                part: part.to_owned(),
                row,
                reason,
            };
            let [begin_text, end_text, tag, label] = <[String; 4]>::try_from(cols)
                .map_err(|_| malformed("wrong column count"))?;
            let begin = parse_hex_offset(&begin_text).ok_or_else(|| malformed("bad begin offset"))?;
            let end = if end_text.is_empty() {
                begin
            } else {
                parse_hex_offset(&end_text).ok_or_else(|| malformed("bad end offset"))?
            };
            if end < begin {
                return Err(malformed("end offset before begin offset"));
            }
            let label = if label.is_empty() {
                if end_text.is_empty() {
                    format!("BIN {begin_text}")
                } else {
                    format!("BIN {begin_text}-{end_text}")
                }
            } else {
                label
            };
            table.push(FieldDescriptor {
                begin,
                end,
                kind: TypeTag::parse(&tag),
                tag,
                label,
            });
        }
        Ok(table)
    }

    fn push(&mut self, field: FieldDescriptor) {
        self.index.insert(field.label.clone(), self.fields.len());
        self.fields.push(field);
    }

    /// Schema position of the field labelled by `key`.
    pub fn position(&self, key: FieldKey) -> Option<usize> {
        self.index.get(key.label()).copied()
    }

    /// Descriptor of the field labelled by `key`.
    pub fn get(&self, key: FieldKey) -> Option<&FieldDescriptor> {
        self.position(key).map(|i| &self.fields[i])
    }

    /// Iterate over descriptors in file order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Lookup from a raw binary-hex code to display text.
///
/// Also used for field-name translation tables (code → name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTable {
    entries: HashMap<String, String>,
}

impl SelectionTable {
    /// Parse a selection table for `part` (e.g. `sex-selection`).
    ///
    /// Replacements are prefixed with the part name minus `selection`, so
    /// row `1\tm` of `sex-selection` maps `"1"` to `"sex-m"`.
    pub fn parse(part: &str, text: &str) -> Result<Self> {
        let prefix = part.replace("selection", "");
        let entries = rows(part, text, 2)?
            .into_iter()
            .map(|(_, mut cols)| {
                let replacement = cols.pop().unwrap_or_default();
                let key = cols.pop().unwrap_or_default();
                (key, format!("{prefix}{replacement}"))
            })
            .collect();
        Ok(Self { entries })
    }

    /// Parse a field-name table: rows whose code starts with a digit.
    pub(crate) fn parse_names(part: &str, text: &str) -> Result<Self> {
        let entries = rows(part, text, 2)?
            .into_iter()
            .filter(|(_, cols)| cols[0].starts_with(|c: char| c.is_ascii_digit()))
            .map(|(_, mut cols)| {
                let name = cols.pop().unwrap_or_default();
                let code = cols.pop().unwrap_or_default();
                (code, name)
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for SelectionTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Named numeric constants, e.g. record lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantTable {
    entries: HashMap<String, usize>,
}

impl ConstantTable {
    /// Parse `name<TAB>value` rows. Extra columns are ignored.
    pub fn parse(part: &str, text: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for (row, line) in lines(text) {
            let mut cols = line.split('\t');
            let Some(name) = cols.next().filter(|n| n.starts_with(is_word_char)) else {
                continue;
            };
            let value = cols
                .next()
                .and_then(|v| v.trim().parse().ok())
                .ok_or_else(|| Error::MalformedRow {
                    part: part.to_owned(),
                    row,
                    reason: "constant is not a decimal number",
                })?;
            entries.insert(name.trim_end().to_owned(), value);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries.get(name).copied()
    }

    /// Look up a constant that must be present.
    pub fn require(&self, name: &'static str) -> Result<usize> {
        self.get(name).ok_or(Error::MissingConstant(name))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Non-comment, non-blank lines with trailing whitespace removed, paired
/// with their 1-based line numbers.
fn lines(text: &str) -> impl Iterator<Item = (u64, &str)> {
    text.lines()
        .zip(1u64..)
        .filter(|(line, _)| !line.starts_with('#'))
        .map(|(line, row)| (row, line.trim_end()))
        .filter(|(_, line)| !line.is_empty())
}

/// Split rows into exactly `columns` tab-separated cells.
fn rows(part: &str, text: &str, columns: usize) -> Result<Vec<(u64, Vec<String>)>> {
    let mut out = Vec::new();
    for (row, line) in lines(text) {
        let mut cols: Vec<String> = line.split('\t').map(str::to_owned).collect();
        if cols.len() + 1 == columns {
            cols.push(String::new());
        }
        if cols.len() != columns {
            return Err(Error::MalformedRow {
                part: part.to_owned(),
                row,
                reason: "wrong column count",
            });
        }
        out.push((row, cols));
    }
    Ok(out)
}
