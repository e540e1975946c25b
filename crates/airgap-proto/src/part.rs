//! Fountain part wire form.
//!
//! A part is the CBOR array `[seq_num, seq_len, message_len, checksum, data]`.
//! Parts with `seq_num <= seq_len` carry one fragment verbatim; later parts
//! carry the XOR of several fragments chosen from `seq_num` and `checksum`.

use crate::{
    cbor::{self, Value},
    errors::{DecodeError, EncodeError, Result},
};

/// One transmitted unit of a fountain-coded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// 1-based sequence number, increasing for the lifetime of the encoder
    pub seq_num: u32,
    /// Number of fragments the message was split into
    pub seq_len: usize,
    /// Length of the unpadded message
    pub message_len: usize,
    /// CRC-32 of the unpadded message
    pub checksum: u32,
    /// Fragment bytes (single or mixed), always one fragment long
    pub data: Vec<u8>,
}

impl Part {
    /// Whether this part carries exactly one fragment by construction.
    pub fn is_pure(&self) -> bool {
        (self.seq_num as usize) <= self.seq_len
    }

    /// Length of every fragment in the transmission.
    pub fn fragment_len(&self) -> usize {
        self.data.len()
    }

    /// Serialize to CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>, EncodeError> {
        let value = Value::Array(vec![
            cbor::uint(self.seq_num),
            cbor::uint(self.seq_len as u64),
            cbor::uint(self.message_len as u64),
            cbor::uint(self.checksum),
            cbor::bytes(self.data.clone()),
        ]);
        cbor::encode(&value)
    }

    /// Parse and validate a part.
    ///
    /// The header must be self-consistent: `seq_len` has to be the fragment
    /// count implied by `message_len` and the fragment length.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let value = cbor::decode(bytes)?;
        let items = cbor::as_array(&value)?;
        let [seq_num, seq_len, message_len, checksum, data] = items else {
            return Err(DecodeError::InvalidLength(format!(
                "part must have 5 elements, got {}",
                items.len()
            )));
        };

        let part = Self {
            seq_num: cbor::as_u32(seq_num)?,
            seq_len: to_usize(cbor::as_u64(seq_len)?)?,
            message_len: to_usize(cbor::as_u64(message_len)?)?,
            checksum: cbor::as_u32(checksum)?,
            data: cbor::as_bytes(data)?.to_vec(),
        };
        part.validate()?;
        Ok(part)
    }

    /// Check that the header is self-consistent.
    pub fn validate(&self) -> Result<()> {
        if self.seq_num == 0 {
            return Err(DecodeError::InvalidPart("sequence numbers start at 1".into()));
        }
        if self.data.is_empty() || self.message_len == 0 {
            return Err(DecodeError::InvalidPart("empty fragment".into()));
        }

        let expected = self.message_len.div_ceil(self.data.len());
        if self.seq_len != expected {
            return Err(DecodeError::InvalidPart(format!(
                "{} fragments of {} bytes cannot carry {} bytes",
                self.seq_len,
                self.data.len(),
                self.message_len
            )));
        }

        Ok(())
    }
}

fn to_usize(n: u64) -> Result<usize> {
    usize::try_from(n).map_err(|_| DecodeError::InvalidLength(format!("{n} does not fit in usize")))
}
