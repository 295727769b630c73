//! Typed field values and the byte-level decoders that produce them.
//!
//! Every schema row carries a type tag. Only the first three characters of
//! the tag select the decoder, so `ascii`, `asc` and `asc-name` all decode
//! as text:
//!
//! | Prefix | Decoder |
//! |--------|---------|
//! | `asc`  | text up to the first zero byte |
//! | `bin`  | binary-hex (opaque identifier) |
//! | `bib`  | binary-hex, byte order reversed |
//! | `b2a`  | hex text re-read as a base-16 number |
//! | `int`  | integer, bytes in stored order |
//! | `inb`  | integer, bytes reversed |
//! | `boo`  | `FF` / `00` flag |
//! | `dat`  | days since 1899-12-30, bytes reversed |
//! | `tim`  | hours byte, minutes byte |
//! | `sel`  | binary-hex looked up in a selection table |
//!
//! Decoding never fails. Unexpected encodings turn into [`Value::Null`] or a
//! marker string.

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::schema::SelectionTable;
use crate::utils::{be_uint, hex_bytes, hex_digits, latin1_to_null};

/// Day zero of the date encoding.
const EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Text, identifiers, dates, times and selection results.
    Str(String),
    /// Unsigned integer.
    Int(u64),
    /// Flag.
    Bool(bool),
    /// A value whose encoding was not understood.
    Null,
}

impl Value {
    /// Borrow the string payload, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The flag payload, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret the value as a count. Flags count as 0/1, numeric strings
    /// are parsed, anything else is 0.
    pub fn as_count(&self) -> usize {
        match self {
            Value::Int(n) => usize::try_from(*n).unwrap_or(usize::MAX),
            Value::Bool(b) => usize::from(*b),
            Value::Str(s) => s.trim().parse().unwrap_or(0),
            Value::Null => 0,
        }
    }

    /// Whether the value reads as "set": a nonzero count or a true flag.
    pub fn is_truthy(&self) -> bool {
        self.as_count() > 0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(true) => f.write_str("1"),
            Value::Bool(false) => f.write_str("0"),
            Value::Null => Ok(()),
        }
    }
}

/// Decoder selected by a schema row's type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    /// `asc`: text up to the first zero byte.
    Ascii,
    /// `bin`: binary-hex.
    BinaryHex,
    /// `bib`: binary-hex of the reversed bytes.
    BinaryHexReversed,
    /// `b2a`: binary-hex text parsed again as base 16.
    HexAsDecimal,
    /// `int`: integer from the bytes in stored order.
    ///
    /// Named little-endian by the file format's tooling, but the bytes are
    /// not reversed. Verified behaviour is kept as-is.
    IntLe,
    /// `inb`: integer from the reversed bytes.
    IntBe,
    /// `boo`: `FF` is true, `00` is false.
    Boolean,
    /// `dat`: day count since 1899-12-30, rendered `DD.MM.YYYY`.
    Date,
    /// `tim`: two bytes, rendered `HH:MM`.
    Time,
    /// `sel`: lookup in a selection table. `area` is set when the tag names
    /// the table explicitly (`sel:<digits>`).
    Selection {
        /// Explicit area override.
        area: Option<String>,
    },
    /// Any other tag. Fields with an unknown tag produce no output.
    Unknown,
}

impl TypeTag {
    /// Classify a raw tag string by its first three characters.
    pub fn parse(tag: &str) -> Self {
        let prefix = tag.get(..3).unwrap_or(tag);
        match prefix {
            "asc" => TypeTag::Ascii,
            "bin" => TypeTag::BinaryHex,
            "bib" => TypeTag::BinaryHexReversed,
            "b2a" => TypeTag::HexAsDecimal,
            "int" => TypeTag::IntLe,
            "inb" => TypeTag::IntBe,
            "boo" => TypeTag::Boolean,
            "dat" => TypeTag::Date,
            "tim" => TypeTag::Time,
            "sel" => {
                let area = tag
                    .strip_prefix("sel:")
                    .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
                    .map(str::to_owned);
                TypeTag::Selection { area }
            }
            _ => TypeTag::Unknown,
        }
    }

    /// Selection table area for a field with this tag and `label`.
    ///
    /// Returns [`None`] for non-selection tags.
    pub fn selection_area(&self, label: &str) -> Option<String> {
        match self {
            TypeTag::Selection { area: Some(area) } => Some(format!("{area}-selection")),
            TypeTag::Selection { area: None } => {
                Some(format!("{}-selection", label.to_lowercase()))
            }
            _ => None,
        }
    }
}

/// Decode `bytes` according to `tag`.
///
/// Returns [`None`] when the field is absent (a zero date, a zero time) or
/// the tag is not a value decoder. [`TypeTag::Selection`] fields need a
/// table; use [`decode_selection`] for them.
pub fn decode(tag: &TypeTag, bytes: &[u8]) -> Option<Value> {
    let value = match tag {
        TypeTag::Ascii => Value::Str(latin1_to_null(bytes)),
        TypeTag::BinaryHex => Value::Str(hex_bytes(bytes)),
        TypeTag::BinaryHexReversed => {
            let reversed: Vec<u8> = bytes.iter().rev().copied().collect();
            Value::Str(hex_bytes(&reversed))
        }
        TypeTag::HexAsDecimal => int_or_null(hex_digits(&hex_bytes(bytes))),
        TypeTag::IntLe => int_or_null(be_uint(bytes)),
        TypeTag::IntBe => int_or_null(be_uint(bytes.iter().rev())),
        TypeTag::Boolean => decode_bool(bytes),
        TypeTag::Date => return decode_date(bytes),
        TypeTag::Time => return decode_time(bytes),
        TypeTag::Selection { .. } | TypeTag::Unknown => return None,
    };
    Some(value)
}

/// Decode a selection field: binary-hex looked up in `table`.
///
/// Unmapped codes yield `"UNKNOWN: <code>"`.
pub fn decode_selection(bytes: &[u8], table: &SelectionTable) -> Value {
    let code = hex_bytes(bytes);
    match table.get(&code) {
        Some(replacement) => Value::Str(replacement.to_owned()),
        None => Value::Str(format!("UNKNOWN: {code}")),
    }
}

fn int_or_null(n: Option<u64>) -> Value {
    n.map_or(Value::Null, Value::Int)
}

fn decode_bool(bytes: &[u8]) -> Value {
    match hex_bytes(bytes).trim_end() {
        "FF" => Value::Bool(true),
        "00" => Value::Bool(false),
        _ => Value::Null,
    }
}

fn decode_date(bytes: &[u8]) -> Option<Value> {
    let days = match be_uint(bytes.iter().rev()) {
        Some(0) => return None,
        Some(days) => days,
        None => return Some(Value::Null),
    };
    let (y, m, d) = EPOCH;
    let date = NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|epoch| epoch.checked_add_days(Days::new(days)));
    Some(match date {
        Some(date) => Value::Str(date.format("%d.%m.%Y").to_string()),
        None => Value::Null,
    })
}

fn decode_time(bytes: &[u8]) -> Option<Value> {
    if hex_bytes(bytes) == "00" {
        return None;
    }
    Some(match bytes {
        [hours, minutes, ..] => Value::Str(format!("{hours:02}:{minutes:02}")),
        _ => Value::Null,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn table(rows: &[(&str, &str)]) -> SelectionTable {
        rows.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn tag_prefixes() {
        assert_eq!(TypeTag::parse("asc"), TypeTag::Ascii);
        assert_eq!(TypeTag::parse("ascii"), TypeTag::Ascii);
        assert_eq!(TypeTag::parse("inb"), TypeTag::IntBe);
        assert_eq!(TypeTag::parse("sel"), TypeTag::Selection { area: None });
        assert_eq!(
            TypeTag::parse("sel:12"),
            TypeTag::Selection {
                area: Some("12".into())
            }
        );
        assert_eq!(TypeTag::parse("sel:x"), TypeTag::Selection { area: None });
        assert_eq!(TypeTag::parse("zzz"), TypeTag::Unknown);
        assert_eq!(TypeTag::parse(""), TypeTag::Unknown);
    }

    #[test]
    fn selection_area_names() {
        let sel = TypeTag::parse("sel");
        assert_eq!(sel.selection_area("Sex").as_deref(), Some("sex-selection"));
        let over = TypeTag::parse("sel:7");
        assert_eq!(over.selection_area("Sex").as_deref(), Some("7-selection"));
        assert_eq!(TypeTag::Ascii.selection_area("Sex"), None);
    }

    #[test]
    fn ascii_stops_at_null() {
        assert_eq!(
            decode(&TypeTag::Ascii, b"Open 2012\0\xde\xad"),
            Some(Value::Str("Open 2012".into()))
        );
    }

    #[test]
    fn integers_keep_tag_byte_order() {
        assert_eq!(decode(&TypeTag::IntLe, &[0x01, 0x02]), Some(Value::Int(0x0102)));
        assert_eq!(decode(&TypeTag::IntBe, &[0x01, 0x02]), Some(Value::Int(0x0201)));
        assert_eq!(decode(&TypeTag::IntLe, &[]), Some(Value::Int(0)));
        assert_eq!(decode(&TypeTag::IntBe, &[0xff; 9]), Some(Value::Null));
    }

    #[test]
    fn hex_as_decimal() {
        assert_eq!(decode(&TypeTag::HexAsDecimal, &[0x00, 0x12]), Some(Value::Int(0x12)));
        assert_eq!(decode(&TypeTag::HexAsDecimal, &[]), Some(Value::Int(0)));
    }

    #[test]
    fn binary_hex_forms() {
        assert_eq!(
            decode(&TypeTag::BinaryHex, &[0x00, 0x0a, 0x01]),
            Some(Value::Str("0A 01".into()))
        );
        assert_eq!(
            decode(&TypeTag::BinaryHexReversed, &[0x0a, 0x01, 0x00]),
            Some(Value::Str("01 0A".into()))
        );
    }

    #[test]
    fn dates() {
        assert_eq!(decode(&TypeTag::Date, &[0, 0]), None);
        assert_eq!(decode(&TypeTag::Date, &[1, 0]), Some(Value::Str("31.12.1899".into())));
        assert_eq!(decode(&TypeTag::Date, &[2, 0]), Some(Value::Str("01.01.1900".into())));
        // 41000 days = 2012-04-01
        assert_eq!(
            decode(&TypeTag::Date, &41000u32.to_le_bytes()),
            Some(Value::Str("01.04.2012".into()))
        );
        assert_eq!(decode(&TypeTag::Date, &[0xff; 8]), Some(Value::Null));
    }

    #[test]
    fn times() {
        assert_eq!(decode(&TypeTag::Time, &[0, 0]), None);
        assert_eq!(decode(&TypeTag::Time, &[9, 5]), Some(Value::Str("09:05".into())));
        assert_eq!(decode(&TypeTag::Time, &[0, 30]), Some(Value::Str("00:30".into())));
        assert_eq!(decode(&TypeTag::Time, &[7]), Some(Value::Null));
    }

    #[test]
    fn selections() {
        let sexes = table(&[("01", "sex-m"), ("02", "sex-f")]);
        assert_eq!(decode_selection(&[0x01], &sexes), Value::Str("sex-m".into()));
        assert_eq!(decode_selection(&[0x05], &sexes), Value::Str("UNKNOWN: 05".into()));
        assert_eq!(decode(&TypeTag::parse("sel"), &[0x01]), None);
    }

    #[test]
    fn unknown_tag_is_silent() {
        assert_eq!(decode(&TypeTag::Unknown, b"abc"), None);
    }

    #[test]
    fn counts_and_flags() {
        assert_eq!(Value::Int(7).as_count(), 7);
        assert_eq!(Value::Bool(true).as_count(), 1);
        assert_eq!(Value::Str(" 12 ".into()).as_count(), 12);
        assert!(!Value::Null.is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }

    proptest! {
        #[test]
        fn ascii_is_prefix_before_null(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let Some(Value::Str(text)) = decode(&TypeTag::Ascii, &bytes) else {
                panic!("ascii must decode to a string");
            };
            let raw: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            prop_assert!(!raw.contains(&0));
            prop_assert_eq!(&raw[..], &bytes[..end]);
        }

        #[test]
        fn boolean_is_total(bytes in proptest::collection::vec(any::<u8>(), 0..4)) {
            let value = decode(&TypeTag::Boolean, &bytes);
            prop_assert!(matches!(
                value,
                Some(Value::Bool(true)) | Some(Value::Bool(false)) | Some(Value::Null)
            ));
        }

        #[test]
        fn single_byte_boolean(b in any::<u8>()) {
            let expected = match b {
                0xff => Value::Bool(true),
                0x00 => Value::Bool(false),
                _ => Value::Null,
            };
            prop_assert_eq!(decode(&TypeTag::Boolean, &[b]), Some(expected));
        }
    }
}
