//! Applying a field table to a window of the file.

use indexmap::IndexMap;

use crate::Result;
use crate::fields::FieldKey;
use crate::schema::{SchemaResolver, TableSource};
use crate::utils::{inclusive, window};
use crate::value::{self, TypeTag, Value};

/// Which schema field produced which bytes of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Provenance {
    /// First byte, absolute file offset.
    pub begin: usize,
    /// Last byte (inclusive), absolute file offset.
    pub end: usize,
    /// Raw type tag of the field.
    pub tag: String,
    /// Field label.
    pub label: String,
}

/// Decoded fields of one region, in schema order, plus their provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedRegion {
    /// Label → value.
    pub fields: IndexMap<String, Value>,
    /// Byte ranges that were decoded, in schema order.
    pub provenance: Vec<Provenance>,
}

impl DecodedRegion {
    /// Value of the field labelled by `key`.
    pub fn get(&self, key: FieldKey) -> Option<&Value> {
        self.fields.get(key.label())
    }

    /// Value of `key` rendered as text; absent fields render as "".
    pub fn text(&self, key: FieldKey) -> String {
        self.get(key).map(Value::to_string).unwrap_or_default()
    }
}

/// Decodes byte windows with the tables of a [`SchemaResolver`].
#[derive(Debug)]
pub struct RegionDecoder<'a, S> {
    schema: &'a SchemaResolver<S>,
}

impl<S> Clone for RegionDecoder<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for RegionDecoder<'_, S> {}

impl<'a, S: TableSource> RegionDecoder<'a, S> {
    pub fn new(schema: &'a SchemaResolver<S>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a SchemaResolver<S> {
        self.schema
    }

    /// Decode `part` over `buffer[start..start + len]`, or over the whole
    /// buffer if `window` is [`None`].
    ///
    /// Schema offsets are relative to the window; provenance offsets are
    /// shifted back to absolute file positions. Fields past the end of the
    /// buffer decode from truncated (possibly empty) slices.
    pub fn decode(
        &self,
        buffer: &[u8],
        part: &str,
        window_range: Option<(usize, usize)>,
    ) -> Result<DecodedRegion> {
        let (start, bytes) = match window_range {
            Some((start, len)) => (start, window(buffer, start, len)),
            None => (0, buffer),
        };
        let table = self.schema.fields(part)?;

        let mut region = DecodedRegion::default();
        for field in table.iter() {
            let slice = inclusive(bytes, field.begin, field.end);
            let value = match &field.kind {
                TypeTag::Unknown => continue,
                kind @ TypeTag::Selection { .. } => {
                    let Some(area) = kind.selection_area(&field.label) else {
                        continue;
                    };
                    let table = self.schema.selection(&area)?;
                    Some(value::decode_selection(slice, &table))
                }
                kind => value::decode(kind, slice),
            };
            region.provenance.push(Provenance {
                begin: field.begin + start,
                end: field.end + start,
                tag: field.tag.clone(),
                label: field.label.clone(),
            });
            if let Some(value) = value {
                region.fields.insert(field.label.clone(), value);
            }
        }
        Ok(region)
    }
}
