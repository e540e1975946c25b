//! Wire layer for airgapped QR transport.
//!
//! Everything that crosses the visual channel passes through this crate: the
//! canonical CBOR codec that registry records serialize into, the fountain
//! [`Part`] that carries one fragment of a message, bytewords, and the `ur:`
//! string framing that wraps it all into QR-friendly text.
//!
//! Nothing here holds session state. Fountain sessions live in `airgap-core`
//! and typed records in `airgap-registry`.
//!
//! # Security
//!
//! Scanned QR content is attacker-controlled. Every length read from the wire
//! is checked against the bytes that remain before it is used, documents are
//! capped at 16 MiB, nesting at 64 levels, and every failure is a typed
//! [`DecodeError`]. Nothing in this crate panics on malformed input.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bytewords;
pub mod cbor;
pub mod errors;
pub mod part;
pub mod ur;

pub use bytewords::crc32;
pub use cbor::Value;
pub use errors::{DecodeError, EncodeError, Result};
pub use part::Part;
pub use ur::{Ur, UrBody, UrType, encode_part, encode_single};
