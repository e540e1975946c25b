//! Uniform Resource strings.
//!
//! ```text
//! ur:<type>/<body>                   single-part message
//! ur:<type>/<seq_num>-<seq_len>/<body> one fountain part
//! ```
//!
//! `<body>` is minimal bytewords over the message CBOR (single part) or the
//! [`Part`] CBOR (multi part). Parsing accepts any letter case; output is
//! upper case, which QR alphanumeric mode encodes compactly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    bytewords::{self, Style},
    errors::{DecodeError, EncodeError, Result},
    part::Part,
};

const SCHEME: &str = "ur:";

/// Registry message type name such as `crypto-hdkey`.
///
/// Lowercase ASCII letters, digits and `-` only; stored in lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrType(String);

impl UrType {
    /// Validate and normalize a type name.
    pub fn new(name: impl Into<String>) -> Result<Self, EncodeError> {
        let name = name.into().to_ascii_lowercase();
        if is_valid_type(&name) { Ok(Self(name)) } else { Err(EncodeError::InvalidUrType(name)) }
    }

    /// Type name in lowercase.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UrType {
    type Error = EncodeError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<UrType> for String {
    fn from(ur_type: UrType) -> Self {
        ur_type.0
    }
}

impl fmt::Display for UrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_type(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Payload of a parsed UR string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrBody {
    /// Whole message CBOR
    Single(Vec<u8>),
    /// One fountain part
    Multi(Part),
}

/// A parsed UR string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ur {
    /// Message type
    pub ur_type: UrType,
    /// Message or part
    pub body: UrBody,
}

impl Ur {
    /// Parse a UR string.
    ///
    /// For multi-part strings the `<seq_num>-<seq_len>` path segment must
    /// agree with the part header carried in the body.
    pub fn parse(text: &str) -> Result<Self> {
        let lower = text.trim().to_ascii_lowercase();
        let rest = lower
            .strip_prefix(SCHEME)
            .ok_or_else(|| DecodeError::InvalidUr("missing ur: scheme".into()))?;

        let segments: Vec<&str> = rest.split('/').collect();
        let (type_name, sequence, body) = match segments.as_slice() {
            [type_name, body] => (*type_name, None, *body),
            [type_name, sequence, body] => (*type_name, Some(*sequence), *body),
            _ => return Err(DecodeError::InvalidUr("expected 2 or 3 path segments".into())),
        };

        if !is_valid_type(type_name) {
            return Err(DecodeError::InvalidUr(format!("invalid type {type_name:?}")));
        }
        let ur_type = UrType(type_name.to_owned());

        let payload = bytewords::decode(body, Style::Minimal)?;

        let body = match sequence {
            None => UrBody::Single(payload),
            Some(sequence) => {
                let (seq_num, seq_len) = parse_sequence(sequence)?;
                let part = Part::from_cbor(&payload)?;
                if part.seq_num != seq_num || part.seq_len != seq_len {
                    return Err(DecodeError::InvalidPart(format!(
                        "path says {seq_num}-{seq_len}, body says {}-{}",
                        part.seq_num, part.seq_len
                    )));
                }
                UrBody::Multi(part)
            },
        };

        Ok(Self { ur_type, body })
    }
}

fn parse_sequence(sequence: &str) -> Result<(u32, usize)> {
    let invalid = || DecodeError::InvalidUr(format!("invalid sequence {sequence:?}"));
    let (seq_num, seq_len) = sequence.split_once('-').ok_or_else(invalid)?;
    let seq_num = seq_num.parse::<u32>().map_err(|_| invalid())?;
    let seq_len = seq_len.parse::<usize>().map_err(|_| invalid())?;
    if seq_num == 0 || seq_len == 0 {
        return Err(invalid());
    }
    Ok((seq_num, seq_len))
}

/// Render a whole message as a single-part UR string.
pub fn encode_single(ur_type: &UrType, message: &[u8]) -> String {
    let body = bytewords::encode(message, Style::Minimal);
    format!("{SCHEME}{ur_type}/{body}").to_ascii_uppercase()
}

/// Render one fountain part as a multi-part UR string.
pub fn encode_part(ur_type: &UrType, part: &Part) -> Result<String, EncodeError> {
    let body = bytewords::encode(&part.to_cbor()?, Style::Minimal);
    Ok(format!("{SCHEME}{ur_type}/{}-{}/{body}", part.seq_num, part.seq_len).to_ascii_uppercase())
}
