//! Hierarchical deterministic keys (crypto-hdkey).

use std::{fmt, str::FromStr};

use airgap_proto::{
    DecodeError, Result,
    cbor::{self, MapBuilder, MapView, Value},
};
use serde::{Deserialize, Serialize};

use crate::{
    coin_info::CoinInfo,
    keypath::{Fingerprint, KeyPath},
    registry_type::RegistryType,
    schema::Capabilities,
    tags::{self, hdkey_keys, lengths},
};

/// Derivation scheme a wallet used to produce an account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Note {
    /// BIP-44 account key
    #[default]
    #[serde(rename = "account.standard")]
    Standard,
    /// Ledger legacy (MEW-style) derivation
    #[serde(rename = "account.ledger_legacy")]
    LedgerLegacy,
    /// Ledger Live derivation, one account per key
    #[serde(rename = "account.ledger_live")]
    LedgerLive,
}

impl Note {
    /// Wire text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "account.standard",
            Self::LedgerLegacy => "account.ledger_legacy",
            Self::LedgerLive => "account.ledger_live",
        }
    }

    /// Read wire text. Unknown notes read as [`Note::Standard`] so that newer
    /// devices stay readable.
    pub fn from_wire(text: &str) -> Self {
        match text {
            "account.ledger_legacy" => Self::LedgerLegacy,
            "account.ledger_live" => Self::LedgerLive,
            "account.standard" => Self::Standard,
            other => {
                tracing::debug!(note = other, "Unknown HD key note, reading as standard");
                Self::Standard
            },
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extended public (or private) key with its derivation metadata.
///
/// `is_master` and `is_private` are optional booleans on the wire. Absent
/// and explicit `false` are kept apart so decoded keys re-encode
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HdKey {
    /// Master key flag
    pub is_master: Option<bool>,
    /// Private key flag
    pub is_private: Option<bool>,
    /// Compressed public key, or `0x00 || private key`
    pub key_data: [u8; lengths::KEY_DATA],
    /// BIP-32 chain code
    pub chain_code: Option<[u8; lengths::CHAIN_CODE]>,
    /// Coin and network the key is meant for
    pub use_info: Option<CoinInfo>,
    /// How this key was derived from its source
    pub origin: Option<KeyPath>,
    /// Which children of this key are meant to be used
    pub children: Option<KeyPath>,
    /// Fingerprint of the parent key
    pub parent_fingerprint: Option<Fingerprint>,
    /// Short display name
    pub name: Option<String>,
    /// Derivation scheme of the producing wallet
    pub note: Option<Note>,
}

impl HdKey {
    /// Public key without any metadata.
    pub const fn from_key_data(key_data: [u8; lengths::KEY_DATA]) -> Self {
        Self {
            is_master: None,
            is_private: None,
            key_data,
            chain_code: None,
            use_info: None,
            origin: None,
            children: None,
            parent_fingerprint: None,
            name: None,
            note: None,
        }
    }

    /// Parse the key from 66 hex digits.
    pub fn from_key_hex(key_hex: &str) -> Result<Self> {
        let mut key_data = [0u8; lengths::KEY_DATA];
        hex::decode_to_slice(key_hex, &mut key_data)
            .map_err(|err| DecodeError::InvalidHex(format!("key data: {err}")))?;
        Ok(Self::from_key_data(key_data))
    }

    /// Key data as lowercase hex.
    pub fn key_hex(&self) -> String {
        hex::encode(self.key_data)
    }

    /// Chain code as lowercase hex.
    pub fn chain_code_hex(&self) -> Option<String> {
        self.chain_code.map(hex::encode)
    }

    /// Fingerprint of the key this one was derived from, if the origin
    /// carries it.
    pub fn source_fingerprint(&self) -> Option<Fingerprint> {
        self.origin.as_ref().and_then(|origin| origin.source_fingerprint)
    }

    /// Note, reading an absent one as [`Note::Standard`].
    pub fn note_or_default(&self) -> Note {
        self.note.unwrap_or_default()
    }

    /// Whether this is a private key. Absent means public.
    pub fn is_private(&self) -> bool {
        self.is_private.unwrap_or(false)
    }

    /// The same key without its chain code, for watch-only use.
    #[must_use]
    pub fn without_chain_code(mut self) -> Self {
        self.chain_code = None;
        self
    }

    /// 65-byte uncompressed SEC1 form of the public key.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidKey`] for private keys and for key data that is
    /// not a point on secp256k1.
    pub fn uncompressed_key(&self) -> Result<[u8; 65]> {
        if self.is_private() {
            return Err(DecodeError::InvalidKey);
        }
        uncompress(&self.key_data)
    }
}

fn uncompress(compressed: &[u8]) -> Result<[u8; 65]> {
    let key = secp256k1::PublicKey::from_slice(compressed).map_err(|_| DecodeError::InvalidKey)?;
    Ok(key.serialize_uncompressed())
}

/// Uncompress a hex-encoded secp256k1 public key.
///
/// Accepts the 33-byte compressed form (and, unchanged, the 65-byte
/// uncompressed form); returns 130 lowercase hex digits starting with `04`.
pub fn uncompress_public_key(key_hex: &str) -> Result<String> {
    let bytes =
        hex::decode(key_hex).map_err(|err| DecodeError::InvalidHex(format!("public key: {err}")))?;
    uncompress(&bytes).map(hex::encode)
}

impl FromStr for Note {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_wire(s))
    }
}

impl RegistryType for HdKey {
    const TAG: u64 = tags::HDKEY;
    const UR_TYPE: &'static str = "crypto-hdkey";

    fn to_cbor_with(&self, capabilities: Capabilities) -> Value {
        let name = self.name.clone().filter(|_| capabilities.contains(Capabilities::HDKEY_NAME));
        let note = self.note.filter(|_| capabilities.contains(Capabilities::HDKEY_NOTE));

        MapBuilder::new()
            .insert_opt(hdkey_keys::IS_MASTER, self.is_master.map(Value::Bool))
            .insert_opt(hdkey_keys::IS_PRIVATE, self.is_private.map(Value::Bool))
            .insert(hdkey_keys::KEY_DATA, cbor::bytes(self.key_data))
            .insert_opt(hdkey_keys::CHAIN_CODE, self.chain_code.map(cbor::bytes))
            .insert_opt(
                hdkey_keys::USE_INFO,
                self.use_info.map(|info| cbor::tagged(tags::COIN_INFO, info.to_cbor())),
            )
            .insert_opt(
                hdkey_keys::ORIGIN,
                self.origin.as_ref().map(|path| cbor::tagged(tags::KEYPATH, path.to_cbor())),
            )
            .insert_opt(
                hdkey_keys::CHILDREN,
                self.children.as_ref().map(|path| cbor::tagged(tags::KEYPATH, path.to_cbor())),
            )
            .insert_opt(hdkey_keys::PARENT_FINGERPRINT, self.parent_fingerprint.map(|fp| cbor::uint(fp.0)))
            .insert_opt(hdkey_keys::NAME, name.map(cbor::text))
            .insert_opt(hdkey_keys::NOTE, note.map(|note| cbor::text(note.as_str())))
            .build()
    }

    fn from_cbor(value: &Value) -> Result<Self> {
        let map = MapView::new(value)?;
        let keypath = |key| {
            map.get(key)
                .map(|v| KeyPath::from_cbor(cbor::untag(v, tags::KEYPATH, "crypto-keypath")?))
                .transpose()
        };

        Ok(Self {
            is_master: map.get(hdkey_keys::IS_MASTER).map(cbor::as_bool).transpose()?,
            is_private: map.get(hdkey_keys::IS_PRIVATE).map(cbor::as_bool).transpose()?,
            key_data: cbor::as_byte_array(map.required(hdkey_keys::KEY_DATA, "key-data")?, "key-data")?,
            chain_code: map
                .get(hdkey_keys::CHAIN_CODE)
                .map(|v| cbor::as_byte_array(v, "chain-code"))
                .transpose()?,
            use_info: map
                .get(hdkey_keys::USE_INFO)
                .map(|v| CoinInfo::from_cbor(cbor::untag(v, tags::COIN_INFO, "crypto-coin-info")?))
                .transpose()?,
            origin: keypath(hdkey_keys::ORIGIN)?,
            children: keypath(hdkey_keys::CHILDREN)?,
            parent_fingerprint: map
                .get(hdkey_keys::PARENT_FINGERPRINT)
                .map(|v| cbor::as_u32(v).map(Fingerprint))
                .transpose()?,
            name: map.get(hdkey_keys::NAME).map(|v| cbor::as_text(v).map(str::to_owned)).transpose()?,
            note: map.get(hdkey_keys::NOTE).map(|v| cbor::as_text(v).map(Note::from_wire)).transpose()?,
        })
    }
}
