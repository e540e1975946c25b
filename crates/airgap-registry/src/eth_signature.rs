//! Ethereum signatures (eth-signature), the device's answer to an
//! [`EthSignRequest`](crate::EthSignRequest).

use airgap_proto::{
    DecodeError, Result,
    cbor::{self, MapBuilder, MapView, Value},
};

use crate::{
    eth_sign_request::RequestId,
    registry_type::RegistryType,
    schema::Capabilities,
    tags::{self, eth_signature_keys as keys, lengths},
};

/// Recoverable ECDSA signature for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EthSignature {
    /// Id of the request being answered
    pub request_id: RequestId,
    /// `r || s || v`
    pub signature: [u8; lengths::SIGNATURE],
    /// Name of the signing device
    pub origin: Option<String>,
}

impl EthSignature {
    /// Signature answering `request_id`.
    pub fn new(request_id: RequestId, signature: [u8; lengths::SIGNATURE]) -> Self {
        Self { request_id, signature, origin: None }
    }

    /// Parse `r || s || v` from 130 hex digits.
    pub fn from_hex(request_id: RequestId, signature_hex: &str) -> Result<Self> {
        let mut signature = [0u8; lengths::SIGNATURE];
        hex::decode_to_slice(signature_hex, &mut signature)
            .map_err(|err| DecodeError::InvalidHex(format!("signature: {err}")))?;
        Ok(Self::new(request_id, signature))
    }

    /// Signature as lowercase hex.
    pub fn signature_hex(&self) -> String {
        hex::encode(self.signature)
    }

    /// First half of the signature.
    pub fn r(&self) -> &[u8] {
        &self.signature[..32]
    }

    /// Second half of the signature.
    pub fn s(&self) -> &[u8] {
        &self.signature[32..64]
    }

    /// Recovery byte.
    pub fn v(&self) -> u8 {
        self.signature[64]
    }
}

impl RegistryType for EthSignature {
    const TAG: u64 = tags::ETH_SIGNATURE;
    const UR_TYPE: &'static str = "eth-signature";

    fn to_cbor_with(&self, _capabilities: Capabilities) -> Value {
        MapBuilder::new()
            .insert(keys::REQUEST_ID, self.request_id.to_cbor())
            .insert(keys::SIGNATURE, cbor::bytes(self.signature))
            .insert_opt(keys::ORIGIN, self.origin.clone().map(cbor::text))
            .build()
    }

    fn from_cbor(value: &Value) -> Result<Self> {
        let map = MapView::new(value)?;
        Ok(Self {
            request_id: RequestId::from_cbor(map.required(keys::REQUEST_ID, "request-id")?)?,
            signature: cbor::as_byte_array(map.required(keys::SIGNATURE, "signature")?, "signature")?,
            origin: map.get(keys::ORIGIN).map(|v| cbor::as_text(v).map(str::to_owned)).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_splits_into_r_s_v() {
        let mut signature = [0u8; 65];
        signature[..32].fill(0xaa);
        signature[32..64].fill(0xbb);
        signature[64] = 0x1b;
        let sig = EthSignature::new(RequestId([0; 16]), signature);

        assert!(sig.r().iter().all(|b| *b == 0xaa));
        assert!(sig.s().iter().all(|b| *b == 0xbb));
        assert_eq!(sig.v(), 27);
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let value = MapBuilder::new()
            .insert(keys::REQUEST_ID, RequestId([1; 16]).to_cbor())
            .insert(keys::SIGNATURE, cbor::bytes([0u8; 64]))
            .build();
        assert!(matches!(EthSignature::from_cbor(&value), Err(DecodeError::InvalidLength(_))));
    }

    #[test]
    fn request_id_must_be_a_uuid() {
        let value = MapBuilder::new()
            .insert(keys::REQUEST_ID, cbor::bytes([1u8; 16]))
            .insert(keys::SIGNATURE, cbor::bytes([0u8; 65]))
            .build();
        assert_eq!(EthSignature::from_cbor(&value), Err(DecodeError::UnexpectedType { expected: "uuid" }));
    }
}
