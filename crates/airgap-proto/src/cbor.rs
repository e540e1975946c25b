//! Binary tagged codec (canonical CBOR).
//!
//! Values are `ciborium` values: unsigned integers, byte strings, text
//! strings, arrays, maps, semantic tags and booleans. Encoding is canonical
//! (RFC 8949 §4.2.1): definite lengths, shortest integer headers, and map
//! entries ordered by their encoded key bytes (length first, then
//! lexicographic). For the small integer keys used by the registry this is
//! plain ascending key order, which is what makes checksums reproducible.
//!
//! # Security
//!
//! Decoding runs a structural scan before handing bytes to `ciborium`. The
//! scan checks every string length and container count against the bytes that
//! actually remain, so a forged length prefix is rejected as
//! [`DecodeError::Truncated`] before anything is allocated for it.

use std::cmp::Ordering;

pub use ciborium::value::{Integer, Value};

use crate::errors::{DecodeError, EncodeError, Result};

/// Largest CBOR document accepted by [`decode`].
pub const MAX_DOCUMENT_LEN: usize = 16 * 1024 * 1024;

/// Deepest container nesting accepted by [`decode`].
pub const MAX_NESTING_DEPTH: usize = 64;

/// Encode a value to canonical CBOR bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut canonical = value.clone();
    canonicalize(&mut canonical)?;

    let mut out = Vec::new();
    ciborium::ser::into_writer(&canonical, &mut out)
        .map_err(|e| EncodeError::Cbor(e.to_string()))?;
    Ok(out)
}

/// Decode exactly one CBOR item from `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    if bytes.len() > MAX_DOCUMENT_LEN {
        return Err(DecodeError::InvalidLength(format!(
            "document of {} bytes exceeds {MAX_DOCUMENT_LEN}",
            bytes.len()
        )));
    }

    scan(bytes)?;

    let mut reader = bytes;
    let value: Value = ciborium::de::from_reader(&mut reader).map_err(|e| match e {
        ciborium::de::Error::Io(_) => DecodeError::Truncated,
        ciborium::de::Error::Syntax(_) => DecodeError::InvalidTag,
        ciborium::de::Error::Semantic(..) => {
            DecodeError::UnexpectedType { expected: "well-formed CBOR value" }
        },
        ciborium::de::Error::RecursionLimitExceeded => {
            DecodeError::InvalidLength("nesting too deep".into())
        },
    })?;

    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes);
    }

    Ok(value)
}

fn canonicalize(value: &mut Value) -> Result<(), EncodeError> {
    match value {
        Value::Array(items) => {
            for item in items {
                canonicalize(item)?;
            }
        },
        Value::Map(entries) => {
            let mut keyed = Vec::with_capacity(entries.len());
            for (mut key, mut val) in std::mem::take(entries) {
                canonicalize(&mut key)?;
                canonicalize(&mut val)?;

                let mut key_bytes = Vec::new();
                ciborium::ser::into_writer(&key, &mut key_bytes)
                    .map_err(|e| EncodeError::Cbor(e.to_string()))?;
                keyed.push((key_bytes, key, val));
            }

            keyed.sort_by(|(a, ..), (b, ..)| match a.len().cmp(&b.len()) {
                Ordering::Equal => a.cmp(b),
                other => other,
            });

            *entries = keyed.into_iter().map(|(_, key, val)| (key, val)).collect();
        },
        Value::Tag(_, inner) => canonicalize(inner)?,
        _ => {},
    }

    Ok(())
}

/// Walk item headers without materializing anything.
fn scan(input: &[u8]) -> Result<()> {
    let mut pos = 0usize;
    // Items still to read at each open nesting level.
    let mut open: Vec<u64> = vec![1];

    while let Some(remaining) = open.last_mut() {
        if *remaining == 0 {
            open.pop();
            continue;
        }
        *remaining -= 1;

        let (major, arg) = read_header(input, &mut pos)?;
        let left = (input.len() - pos) as u64;

        match major {
            0 | 1 | 7 => {},
            2 | 3 => {
                if arg > left {
                    return Err(DecodeError::Truncated);
                }
                pos += arg as usize;
            },
            4 => {
                // Every element takes at least one byte.
                if arg > left {
                    return Err(DecodeError::Truncated);
                }
                open.push(arg);
            },
            5 => {
                let items = arg.checked_mul(2).ok_or(DecodeError::Truncated)?;
                if items > left {
                    return Err(DecodeError::Truncated);
                }
                open.push(items);
            },
            _ => open.push(1),
        }

        if open.len() > MAX_NESTING_DEPTH {
            return Err(DecodeError::InvalidLength("nesting too deep".into()));
        }
    }

    if pos != input.len() {
        return Err(DecodeError::TrailingBytes);
    }

    Ok(())
}

fn read_header(input: &[u8], pos: &mut usize) -> Result<(u8, u64)> {
    let initial = *input.get(*pos).ok_or(DecodeError::Truncated)?;
    *pos += 1;

    let major = initial >> 5;
    let info = initial & 0x1f;
    let width = match info {
        0..=23 => return Ok((major, u64::from(info))),
        24 => 1,
        25 => 2,
        26 => 4,
        27 => 8,
        // 28..=30 are reserved, 31 is indefinite length which canonical
        // encoding never produces.
        _ => return Err(DecodeError::InvalidTag),
    };

    let end = pos.checked_add(width).ok_or(DecodeError::Truncated)?;
    let bytes = input.get(*pos..end).ok_or(DecodeError::Truncated)?;
    *pos = end;

    let arg = bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    Ok((major, arg))
}

/// Unsigned integer value.
pub fn uint(n: impl Into<u64>) -> Value {
    Value::Integer(Integer::from(n.into()))
}

/// Semantic tag wrapping `inner`.
pub fn tagged(tag: u64, inner: Value) -> Value {
    Value::Tag(tag, Box::new(inner))
}

/// Byte string value.
pub fn bytes(data: impl Into<Vec<u8>>) -> Value {
    Value::Bytes(data.into())
}

/// Text string value.
pub fn text(s: impl Into<String>) -> Value {
    Value::Text(s.into())
}

/// Builder for integer-keyed maps, the shape of every registry record.
#[derive(Debug, Default)]
pub struct MapBuilder {
    entries: Vec<(Value, Value)>,
}

impl MapBuilder {
    /// Start an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    #[must_use]
    pub fn insert(mut self, key: u64, value: Value) -> Self {
        self.entries.push((uint(key), value));
        self
    }

    /// Add an entry when `value` is present.
    #[must_use]
    pub fn insert_opt(self, key: u64, value: Option<Value>) -> Self {
        match value {
            Some(value) => self.insert(key, value),
            None => self,
        }
    }

    /// Finish the map.
    pub fn build(self) -> Value {
        Value::Map(self.entries)
    }
}

/// Read-only view over an integer-keyed map.
///
/// Construction rejects non-integer and duplicate keys, so lookups are
/// unambiguous.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    entries: &'a [(Value, Value)],
}

impl<'a> MapView<'a> {
    /// View `value` as an integer-keyed map.
    pub fn new(value: &'a Value) -> Result<Self> {
        let entries = value.as_map().ok_or(DecodeError::UnexpectedType { expected: "map" })?;

        let mut seen = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            let key = as_u64(key)?;
            if seen.contains(&key) {
                return Err(DecodeError::DuplicateKey(key));
            }
            seen.push(key);
        }

        Ok(Self { entries })
    }

    /// Entry for `key`, if present.
    pub fn get(&self, key: u64) -> Option<&'a Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_integer().and_then(|i| u64::try_from(i).ok()) == Some(key))
            .map(|(_, v)| v)
    }

    /// Entry for `key`, or [`DecodeError::MissingField`] naming it.
    pub fn required(&self, key: u64, name: &'static str) -> Result<&'a Value> {
        self.get(key).ok_or(DecodeError::MissingField(name))
    }
}

/// Read an unsigned integer.
pub fn as_u64(value: &Value) -> Result<u64> {
    value
        .as_integer()
        .and_then(|i| u64::try_from(i).ok())
        .ok_or(DecodeError::UnexpectedType { expected: "unsigned integer" })
}

/// Read an unsigned integer that must fit in 32 bits.
pub fn as_u32(value: &Value) -> Result<u32> {
    let n = as_u64(value)?;
    u32::try_from(n).map_err(|_| DecodeError::UnexpectedType { expected: "32-bit unsigned integer" })
}

/// Borrow a byte string.
pub fn as_bytes(value: &Value) -> Result<&[u8]> {
    value
        .as_bytes()
        .map(Vec::as_slice)
        .ok_or(DecodeError::UnexpectedType { expected: "byte string" })
}

/// Read a byte string of exactly `N` bytes.
pub fn as_byte_array<const N: usize>(value: &Value, name: &'static str) -> Result<[u8; N]> {
    let data = as_bytes(value)?;
    data.try_into().map_err(|_| {
        DecodeError::InvalidLength(format!("{name}: expected {N} bytes, got {}", data.len()))
    })
}

/// Borrow a text string.
pub fn as_text(value: &Value) -> Result<&str> {
    value.as_text().ok_or(DecodeError::UnexpectedType { expected: "text string" })
}

/// Read a boolean.
pub fn as_bool(value: &Value) -> Result<bool> {
    value.as_bool().ok_or(DecodeError::UnexpectedType { expected: "boolean" })
}

/// Borrow array elements.
pub fn as_array(value: &Value) -> Result<&[Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or(DecodeError::UnexpectedType { expected: "array" })
}

/// Unwrap semantic tag `tag`; `expected` names the tagged type in the error.
pub fn untag<'a>(value: &'a Value, tag: u64, expected: &'static str) -> Result<&'a Value> {
    match value.as_tag() {
        Some((found, inner)) if found == tag => Ok(inner),
        _ => Err(DecodeError::UnexpectedType { expected }),
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn map_keys_are_emitted_in_canonical_order() {
        let value = MapBuilder::new()
            .insert(10, text("late"))
            .insert(2, uint(7u8))
            .insert(300, Value::Bool(true))
            .build();

        let encoded = encode(&value).unwrap();
        assert_eq!(encoded, hex!("a3 0207 0a646c617465 19012cf5"));
    }

    #[test]
    fn integers_use_shortest_header() {
        assert_eq!(encode(&uint(23u8)).unwrap(), hex!("17"));
        assert_eq!(encode(&uint(24u8)).unwrap(), hex!("1818"));
        assert_eq!(encode(&uint(256u16)).unwrap(), hex!("190100"));
        assert_eq!(encode(&uint(0x5200_6ea0u32)).unwrap(), hex!("1a52006ea0"));
        assert_eq!(encode(&uint(1u64 << 32)).unwrap(), hex!("1b0000000100000000"));
    }

    #[test]
    fn tags_round_trip() {
        let value = tagged(37, bytes(vec![0xab; 16]));
        let encoded = encode(&value).unwrap();
        assert_eq!(&encoded[..3], &hex!("d82550"));
        assert_eq!(decode(&encoded).unwrap(), value);
    }

    #[test]
    fn truncated_input_is_rejected() {
        let encoded = encode(&bytes(vec![1, 2, 3, 4])).unwrap();
        assert_eq!(decode(&encoded[..3]), Err(DecodeError::Truncated));
        assert_eq!(decode(&[]), Err(DecodeError::Truncated));
    }

    #[test]
    fn forged_length_prefix_is_rejected_before_allocation() {
        // Byte string claiming 4 GiB with three bytes behind it.
        assert_eq!(decode(&hex!("5affffffff010203")), Err(DecodeError::Truncated));
        // Array claiming 2^64-1 elements.
        assert_eq!(decode(&hex!("9bffffffffffffffff00")), Err(DecodeError::Truncated));
        // Map whose pair count overflows when doubled.
        assert_eq!(decode(&hex!("bbffffffffffffffff00")), Err(DecodeError::Truncated));
    }

    #[test]
    fn reserved_and_indefinite_headers_are_invalid() {
        assert_eq!(decode(&hex!("1c")), Err(DecodeError::InvalidTag));
        assert_eq!(decode(&hex!("9f01ff")), Err(DecodeError::InvalidTag));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        assert_eq!(decode(&hex!("0102")), Err(DecodeError::TrailingBytes));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut doc = vec![0x81; MAX_NESTING_DEPTH + 1];
        doc.push(0x00);
        assert!(matches!(decode(&doc), Err(DecodeError::InvalidLength(_))));
    }

    #[test]
    fn map_view_rejects_duplicate_keys() {
        let value = decode(&hex!("a2 0101 0102")).unwrap();
        assert_eq!(MapView::new(&value).unwrap_err(), DecodeError::DuplicateKey(1));
    }

    #[test]
    fn map_view_reports_missing_fields() {
        let value = MapBuilder::new().insert(1, uint(5u8)).build();
        let view = MapView::new(&value).unwrap();
        assert_eq!(as_u64(view.required(1, "one").unwrap()).unwrap(), 5);
        assert_eq!(view.required(2, "two"), Err(DecodeError::MissingField("two")));
    }

    #[test]
    fn accessors_report_unexpected_types() {
        let value = text("hello");
        assert!(matches!(as_u64(&value), Err(DecodeError::UnexpectedType { .. })));
        assert!(matches!(as_bytes(&value), Err(DecodeError::UnexpectedType { .. })));
        assert_eq!(as_text(&value).unwrap(), "hello");
        assert!(matches!(
            as_byte_array::<4>(&bytes(vec![1, 2, 3]), "fingerprint"),
            Err(DecodeError::InvalidLength(_))
        ));
        assert!(matches!(
            untag(&tagged(304, uint(1u8)), 303, "crypto-hdkey"),
            Err(DecodeError::UnexpectedType { expected: "crypto-hdkey" })
        ));
    }
}
