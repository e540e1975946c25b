//! Error types for the wire layer.
//!
//! Every decode path in the workspace reports failures as a [`DecodeError`].
//! Scanned QR content is untrusted, so nothing in this layer recovers from a
//! malformed input on its own: the failure is surfaced to the caller, who
//! decides whether to keep scanning.

use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Failures while decoding scanned data into parts, values or records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before a complete item was read
    #[error("input truncated")]
    Truncated,

    /// Malformed CBOR header or reserved initial byte
    #[error("invalid CBOR item")]
    InvalidTag,

    /// Length field is inconsistent with the data it describes
    #[error("invalid length: {0}")]
    InvalidLength(String),

    /// Value has a different CBOR type (or tag) than the schema requires
    #[error("unexpected type: expected {expected}")]
    UnexpectedType {
        /// Description of what the schema expected at this position
        expected: &'static str,
    },

    /// Required map entry is absent
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Enumerated value is out of range
    #[error("invalid enum value: {0}")]
    InvalidEnum(u64),

    /// Part belongs to a different transmission than the session
    #[error("part belongs to a different transmission")]
    MixedSessions,

    /// Reassembled message does not match the transmitted checksum
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum carried by the parts
        expected: u32,
        /// Checksum of the reassembled message
        actual: u32,
    },

    /// Message requested before every fragment was solved
    #[error("message incomplete")]
    Incomplete,

    /// Message type differs from the one the caller asked for
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Type the caller asked for
        expected: String,
        /// Type carried by the transmission
        actual: String,
    },

    /// Bytes remain after the top-level CBOR item
    #[error("trailing bytes after CBOR item")]
    TrailingBytes,

    /// Map contains the same key twice
    #[error("duplicate map key {0}")]
    DuplicateKey(u64),

    /// Bytewords body is malformed or fails its CRC
    #[error("invalid bytewords: {0}")]
    InvalidBytewords(&'static str),

    /// UR string does not follow `ur:<type>[/<seq>-<len>]/<body>`
    #[error("invalid UR: {0}")]
    InvalidUr(String),

    /// Part header is internally inconsistent
    #[error("invalid part: {0}")]
    InvalidPart(String),

    /// Same sequence number was seen earlier with different content
    #[error("conflicting content for part {seq_num}")]
    ConflictingPart {
        /// Sequence number that was seen twice
        seq_num: u32,
    },

    /// Message length exceeds the configured limit
    #[error("message too large: {len} bytes exceeds {max}")]
    MessageTooLarge {
        /// Declared message length
        len: usize,
        /// Configured limit
        max: usize,
    },

    /// Part announces more fragments than the configured limit
    #[error("too many fragments: {count} exceeds {max}")]
    TooManyFragments {
        /// Declared fragment count
        count: usize,
        /// Configured limit
        max: usize,
    },

    /// Derivation path text could not be parsed
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    /// Hex text could not be parsed or has the wrong length
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Public key bytes are not a valid curve point
    #[error("invalid public key")]
    InvalidKey,
}

/// Failures while encoding values or starting a transmission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Fountain transmission of an empty message
    #[error("cannot encode empty message")]
    EmptyMessage,

    /// Maximum fragment length is zero or below the configured minimum
    #[error("invalid fragment length {len} (minimum {min})")]
    InvalidFragmentLength {
        /// Requested maximum fragment length
        len: usize,
        /// Configured minimum
        min: usize,
    },

    /// UR type contains characters outside `[a-z0-9-]`
    #[error("invalid UR type {0:?}")]
    InvalidUrType(String),

    /// CBOR serializer failure
    #[error("cbor serialization error: {0}")]
    Cbor(String),
}
