//! Typed registry records for airgapped signing.
//!
//! Each record kind has a stable CBOR tag and UR type name and converts to
//! and from canonical CBOR through [`RegistryType`]:
//!
//! | Record | UR type | Tag |
//! |--------|---------|-----|
//! | [`HdKey`] | `crypto-hdkey` | 303 |
//! | [`Account`] | `crypto-account` | 311 |
//! | [`EthSignRequest`] | `eth-sign-request` | 401 |
//! | [`EthSignature`] | `eth-signature` | 402 |
//!
//! [`Transmitter`] and [`Receiver`] put records on and take them off the
//! fountain-coded UR transport of `airgap-core`.
//!
//! # Decoding rules
//!
//! Decoding never substitutes a default for a required field
//! ([`DecodeError::MissingField`](airgap_proto::DecodeError::MissingField))
//! or an enumerated value
//! ([`DecodeError::InvalidEnum`](airgap_proto::DecodeError::InvalidEnum)).
//! The one exception is the HD key note: unknown notes read as
//! [`Note::Standard`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod coin_info;
pub mod eth_sign_request;
pub mod eth_signature;
pub mod hdkey;
pub mod keypath;
pub mod record;
pub mod registry_type;
pub mod schema;
pub mod session;
pub mod tags;

pub use account::{Account, OutputDescriptor, ScriptExpression};
pub use coin_info::CoinInfo;
pub use eth_sign_request::{EthSignRequest, RequestId, SignType};
pub use eth_signature::EthSignature;
pub use hdkey::{HdKey, Note, uncompress_public_key};
pub use keypath::{Fingerprint, KeyPath, PathComponent};
pub use record::Record;
pub use registry_type::RegistryType;
pub use schema::{Capabilities, SchemaVersion};
pub use session::{Receiver, Transmitter, decode_single, encode_single};
