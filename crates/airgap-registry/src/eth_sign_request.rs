//! Ethereum signing requests (eth-sign-request).
//!
//! Sent from the connected application to the signing device. The device
//! answers with an [`EthSignature`](crate::EthSignature) carrying the same
//! [`RequestId`].

use std::{fmt, str::FromStr};

use airgap_proto::{
    DecodeError, Result,
    cbor::{self, MapBuilder, MapView, Value},
};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{
    keypath::{Fingerprint, KeyPath},
    registry_type::RegistryType,
    schema::Capabilities,
    tags::{self, eth_sign_request_keys as keys, lengths},
};

/// What `sign_data` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum SignType {
    /// RLP-encoded legacy transaction
    Transaction = 1,
    /// EIP-712 typed data
    TypedData = 2,
    /// EIP-191 personal message
    PersonalMessage = 3,
    /// EIP-2718 typed transaction
    TypedTransaction = 4,
}

impl TryFrom<u64> for SignType {
    type Error = DecodeError;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            1 => Ok(Self::Transaction),
            2 => Ok(Self::TypedData),
            3 => Ok(Self::PersonalMessage),
            4 => Ok(Self::TypedTransaction),
            other => Err(DecodeError::InvalidEnum(other)),
        }
    }
}

/// 16-byte request identifier, a UUID on the wire (tag 37).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub [u8; lengths::REQUEST_ID]);

impl RequestId {
    /// Tagged CBOR byte string.
    pub fn to_cbor(&self) -> Value {
        cbor::tagged(tags::UUID, cbor::bytes(self.0))
    }

    /// Parse a tagged CBOR byte string.
    pub fn from_cbor(value: &Value) -> Result<Self> {
        cbor::as_byte_array(cbor::untag(value, tags::UUID, "uuid")?, "request-id").map(Self)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for RequestId {
    type Err = DecodeError;

    /// 32 hex digits; UUID dashes are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let digits: String = s.chars().filter(|c| *c != '-').collect();
        let mut id = [0u8; lengths::REQUEST_ID];
        hex::decode_to_slice(&digits, &mut id)
            .map_err(|err| DecodeError::InvalidHex(format!("request id {s:?}: {err}")))?;
        Ok(Self(id))
    }
}

/// Request to sign `sign_data` with the key at `derivation_path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EthSignRequest {
    /// Echoed back in the signature
    pub request_id: RequestId,
    /// Bytes to sign, interpreted according to `sign_type`
    pub sign_data: Vec<u8>,
    /// Kind of `sign_data`
    pub sign_type: SignType,
    /// EIP-155 chain id
    pub chain_id: Option<u64>,
    /// Signing key path; its source fingerprint identifies the account
    pub derivation_path: KeyPath,
    /// Expected signer address
    pub address: Option<[u8; lengths::ADDRESS]>,
    /// Name of the requesting application
    pub origin: Option<String>,
}

impl EthSignRequest {
    /// Request without chain id, address or origin.
    pub fn new(request_id: RequestId, sign_data: Vec<u8>, sign_type: SignType, derivation_path: KeyPath) -> Self {
        Self { request_id, sign_data, sign_type, chain_id: None, derivation_path, address: None, origin: None }
    }

    /// Fingerprint of the account the path starts from.
    pub fn account_fingerprint(&self) -> Option<Fingerprint> {
        self.derivation_path.source_fingerprint
    }

    /// Sign data as lowercase hex.
    pub fn sign_data_hex(&self) -> String {
        hex::encode(&self.sign_data)
    }

    /// Address as lowercase hex without `0x`.
    pub fn address_hex(&self) -> Option<String> {
        self.address.map(hex::encode)
    }
}

impl RegistryType for EthSignRequest {
    const TAG: u64 = tags::ETH_SIGN_REQUEST;
    const UR_TYPE: &'static str = "eth-sign-request";

    fn to_cbor_with(&self, _capabilities: Capabilities) -> Value {
        MapBuilder::new()
            .insert(keys::REQUEST_ID, self.request_id.to_cbor())
            .insert(keys::SIGN_DATA, cbor::bytes(self.sign_data.as_slice()))
            .insert(keys::DATA_TYPE, cbor::uint(self.sign_type as u8))
            .insert_opt(keys::CHAIN_ID, self.chain_id.map(cbor::uint))
            .insert(keys::DERIVATION_PATH, cbor::tagged(tags::KEYPATH, self.derivation_path.to_cbor()))
            .insert_opt(keys::ADDRESS, self.address.map(cbor::bytes))
            .insert_opt(keys::ORIGIN, self.origin.clone().map(cbor::text))
            .build()
    }

    fn from_cbor(value: &Value) -> Result<Self> {
        let map = MapView::new(value)?;

        let request_id = RequestId::from_cbor(map.required(keys::REQUEST_ID, "request-id")?)?;
        let sign_data = cbor::as_bytes(map.required(keys::SIGN_DATA, "sign-data")?)?.to_vec();
        let sign_type = SignType::try_from(cbor::as_u64(map.required(keys::DATA_TYPE, "data-type")?)?)?;
        let chain_id = map.get(keys::CHAIN_ID).map(cbor::as_u64).transpose()?;
        let derivation_path = KeyPath::from_cbor(cbor::untag(
            map.required(keys::DERIVATION_PATH, "derivation-path")?,
            tags::KEYPATH,
            "crypto-keypath",
        )?)?;
        let address = map.get(keys::ADDRESS).map(|v| cbor::as_byte_array(v, "address")).transpose()?;
        let origin = map.get(keys::ORIGIN).map(|v| cbor::as_text(v).map(str::to_owned)).transpose()?;

        Ok(Self { request_id, sign_data, sign_type, chain_id, derivation_path, address, origin })
    }
}
