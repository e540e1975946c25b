//! The contract every top-level registry record implements.

use airgap_proto::{
    EncodeError, Result,
    cbor::{self, Value},
};

use crate::schema::Capabilities;

/// A record that travels as its own UR message.
///
/// At the top level of a UR message the record is an untagged map. When one
/// record is embedded in another it is wrapped in [`RegistryType::TAG`].
pub trait RegistryType: Sized {
    /// CBOR tag used when the record is embedded
    const TAG: u64;

    /// UR type name
    const UR_TYPE: &'static str;

    /// Untagged CBOR map, emitting only the optional fields `capabilities`
    /// allow.
    fn to_cbor_with(&self, capabilities: Capabilities) -> Value;

    /// Parse an untagged CBOR map.
    ///
    /// # Errors
    ///
    /// [`airgap_proto::DecodeError::MissingField`] for an absent required
    /// field, [`airgap_proto::DecodeError::InvalidEnum`] for an
    /// out-of-range enumerated value, and the shape errors of the codec.
    fn from_cbor(value: &Value) -> Result<Self>;

    /// Untagged CBOR map in the newest schema.
    fn to_cbor(&self) -> Value {
        self.to_cbor_with(Capabilities::default())
    }

    /// CBOR wrapped in [`RegistryType::TAG`].
    fn to_tagged(&self) -> Value {
        cbor::tagged(Self::TAG, self.to_cbor())
    }

    /// Parse a value wrapped in [`RegistryType::TAG`].
    fn from_tagged(value: &Value) -> Result<Self> {
        Self::from_cbor(cbor::untag(value, Self::TAG, Self::UR_TYPE)?)
    }

    /// Canonical message bytes.
    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        cbor::encode(&self.to_cbor())
    }

    /// Parse message bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_cbor(&cbor::decode(bytes)?)
    }
}
