//! Dynamic dispatch over the registry types.

use airgap_proto::{
    DecodeError, EncodeError, Result,
    cbor::{self, Value},
};

use crate::{Account, EthSignRequest, EthSignature, HdKey, registry_type::RegistryType};

/// Any top-level registry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// crypto-hdkey
    HdKey(HdKey),
    /// crypto-account
    Account(Account),
    /// eth-sign-request
    EthSignRequest(EthSignRequest),
    /// eth-signature
    EthSignature(EthSignature),
}

impl Record {
    /// UR type names this crate understands.
    pub const UR_TYPES: [&'static str; 4] =
        [HdKey::UR_TYPE, Account::UR_TYPE, EthSignRequest::UR_TYPE, EthSignature::UR_TYPE];

    /// UR type name.
    pub const fn ur_type(&self) -> &'static str {
        match self {
            Self::HdKey(_) => HdKey::UR_TYPE,
            Self::Account(_) => Account::UR_TYPE,
            Self::EthSignRequest(_) => EthSignRequest::UR_TYPE,
            Self::EthSignature(_) => EthSignature::UR_TYPE,
        }
    }

    /// Embedding tag.
    pub const fn tag(&self) -> u64 {
        match self {
            Self::HdKey(_) => HdKey::TAG,
            Self::Account(_) => Account::TAG,
            Self::EthSignRequest(_) => EthSignRequest::TAG,
            Self::EthSignature(_) => EthSignature::TAG,
        }
    }

    /// Untagged CBOR map.
    pub fn to_cbor(&self) -> Value {
        match self {
            Self::HdKey(r) => r.to_cbor(),
            Self::Account(r) => r.to_cbor(),
            Self::EthSignRequest(r) => r.to_cbor(),
            Self::EthSignature(r) => r.to_cbor(),
        }
    }

    /// Canonical message bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        cbor::encode(&self.to_cbor())
    }

    /// Parse the untagged map of the record with embedding tag `tag`.
    ///
    /// The Ethereum tags double as script-expression tags inside output
    /// descriptors; here they always mean the Ethereum records.
    pub fn from_cbor(tag: u64, value: &Value) -> Result<Self> {
        match tag {
            HdKey::TAG => HdKey::from_cbor(value).map(Self::HdKey),
            Account::TAG => Account::from_cbor(value).map(Self::Account),
            EthSignRequest::TAG => EthSignRequest::from_cbor(value).map(Self::EthSignRequest),
            EthSignature::TAG => EthSignature::from_cbor(value).map(Self::EthSignature),
            other => Err(DecodeError::InvalidEnum(other)),
        }
    }

    /// Parse a tagged record.
    pub fn from_tagged(value: &Value) -> Result<Self> {
        let (tag, inner) = value.as_tag().ok_or(DecodeError::UnexpectedType { expected: "tagged record" })?;
        Self::from_cbor(tag, inner)
    }

    /// Parse the message bytes of a UR of type `ur_type`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::TypeMismatch`] if `ur_type` is not a registry type,
    /// otherwise the decode errors of that type.
    pub fn from_ur_message(ur_type: &str, message: &[u8]) -> Result<Self> {
        match ur_type {
            HdKey::UR_TYPE => HdKey::from_bytes(message).map(Self::HdKey),
            Account::UR_TYPE => Account::from_bytes(message).map(Self::Account),
            EthSignRequest::UR_TYPE => EthSignRequest::from_bytes(message).map(Self::EthSignRequest),
            EthSignature::UR_TYPE => EthSignature::from_bytes(message).map(Self::EthSignature),
            other => Err(DecodeError::TypeMismatch { expected: "registry type".into(), actual: other.to_owned() }),
        }
    }
}

impl From<HdKey> for Record {
    fn from(record: HdKey) -> Self {
        Self::HdKey(record)
    }
}

impl From<Account> for Record {
    fn from(record: Account) -> Self {
        Self::Account(record)
    }
}

impl From<EthSignRequest> for Record {
    fn from(record: EthSignRequest) -> Self {
        Self::EthSignRequest(record)
    }
}

impl From<EthSignature> for Record {
    fn from(record: EthSignature) -> Self {
        Self::EthSignature(record)
    }
}
