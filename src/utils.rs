//! Low-level byte helpers shared by the decoders.
//!
//! None of these fail: out-of-range requests shrink to whatever bytes are
//! actually available, and odd encodings turn into sentinel values.

/// Binary-hex rendering of an empty slice.
pub(crate) const EMPTY_HEX: &str = "XX";

/// Slice `len` bytes starting at `start`, truncated to the buffer end.
#[inline]
pub(crate) fn window(buf: &[u8], start: usize, len: usize) -> &[u8] {
    let end = start.saturating_add(len).min(buf.len());
    buf.get(start..end).unwrap_or(&[])
}

/// Slice the inclusive range `begin..=end`, truncated to the buffer end.
#[inline]
pub(crate) fn inclusive(buf: &[u8], begin: usize, end: usize) -> &[u8] {
    window(buf, begin, end.saturating_sub(begin).saturating_add(1))
}

/// Uppercase, space-separated hex of each byte.
///
/// Leading `00` bytes are dropped, but at least one byte is always kept,
/// so an all-zero slice renders as `"00"`. An empty slice renders as
/// [`EMPTY_HEX`].
pub(crate) fn hex_bytes(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return EMPTY_HEX.to_owned();
    }
    let first = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(bytes.len() - 1);
    bytes[first..]
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Interpret the bytes, in the order given, as one unsigned integer.
///
/// Returns [`None`] if the value does not fit in 64 bits.
pub(crate) fn be_uint<'a, I>(bytes: I) -> Option<u64>
where
    I: IntoIterator<Item = &'a u8>,
{
    bytes.into_iter().try_fold(0u64, |acc, &b| {
        acc.checked_mul(0x100)?.checked_add(u64::from(b))
    })
}

/// Parse every hex digit in `text` as one base-16 number, ignoring any
/// other characters. Text without digits parses as zero.
pub(crate) fn hex_digits(text: &str) -> Option<u64> {
    text.chars()
        .filter_map(|c| c.to_digit(16))
        .try_fold(0u64, |acc, d| acc.checked_mul(16)?.checked_add(u64::from(d)))
}

/// Bytes up to (not including) the first zero byte, one `char` per byte.
pub(crate) fn latin1_to_null(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..end].iter().map(|&b| char::from(b)).collect()
}

/// Parse a hexadecimal schema offset such as `0C` or `1a3`.
pub(crate) fn parse_hex_offset(text: &str) -> Option<usize> {
    usize::from_str_radix(text.trim(), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_strips_leading_zero_bytes() {
        assert_eq!(hex_bytes(&[0x00, 0x00, 0x1A, 0x00]), "1A 00");
        assert_eq!(hex_bytes(&[0x00, 0x00]), "00");
        assert_eq!(hex_bytes(&[0xff]), "FF");
        assert_eq!(hex_bytes(&[]), "XX");
    }

    #[test]
    fn window_truncates_at_end() {
        let buf = [1u8, 2, 3, 4];
        assert_eq!(window(&buf, 2, 10), &[3, 4]);
        assert!(window(&buf, 9, 2).is_empty());
        assert_eq!(inclusive(&buf, 1, 2), &[2, 3]);
        assert_eq!(inclusive(&buf, 3, 3), &[4]);
    }

    #[test]
    fn uint_overflow_is_none() {
        assert_eq!(be_uint(&[0x01, 0x02]), Some(0x0102));
        assert_eq!(be_uint(&[0x01; 8]), Some(0x0101_0101_0101_0101));
        assert_eq!(be_uint(&[0x01; 9]), None);
        assert_eq!(be_uint(&[0x00; 12]), Some(0));
    }

    #[test]
    fn hex_digits_skips_separators() {
        assert_eq!(hex_digits("01 23"), Some(0x0123));
        assert_eq!(hex_digits("XX"), Some(0));
    }

    #[test]
    fn latin1_keeps_high_bytes() {
        assert_eq!(latin1_to_null(b"M\xfcller\0junk"), "Müller");
        assert_eq!(latin1_to_null(b"abc"), "abc");
    }
}
