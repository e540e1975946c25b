//! Coin and network a key is meant for (crypto-coin-info).

use airgap_proto::{
    Result,
    cbor::{self, MapBuilder, MapView, Value},
};
use serde::{Deserialize, Serialize};

use crate::tags::coin_info_keys;

/// SLIP-44 coin type of Bitcoin.
pub const COIN_TYPE_BITCOIN: u32 = 0;
/// SLIP-44 coin type of Ethereum.
pub const COIN_TYPE_ETHEREUM: u32 = 60;
/// Network id of mainnet.
pub const NETWORK_MAINNET: u32 = 0;

/// Intended use of a key.
///
/// Both fields are optional on the wire and default to Bitcoin mainnet when
/// absent. Absent and explicit-zero are kept apart so a decoded record
/// re-encodes to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CoinInfo {
    /// SLIP-44 coin type
    pub coin_type: Option<u32>,
    /// Network id
    pub network: Option<u32>,
}

impl CoinInfo {
    /// Ethereum mainnet, both fields explicit.
    pub const fn ethereum() -> Self {
        Self { coin_type: Some(COIN_TYPE_ETHEREUM), network: Some(NETWORK_MAINNET) }
    }

    /// Coin type, defaulting to Bitcoin.
    pub fn coin_type(&self) -> u32 {
        self.coin_type.unwrap_or(COIN_TYPE_BITCOIN)
    }

    /// Network, defaulting to mainnet.
    pub fn network(&self) -> u32 {
        self.network.unwrap_or(NETWORK_MAINNET)
    }

    /// Untagged CBOR map.
    pub fn to_cbor(&self) -> Value {
        MapBuilder::new()
            .insert_opt(coin_info_keys::COIN_TYPE, self.coin_type.map(cbor::uint))
            .insert_opt(coin_info_keys::NETWORK, self.network.map(cbor::uint))
            .build()
    }

    /// Parse an untagged CBOR map.
    pub fn from_cbor(value: &Value) -> Result<Self> {
        let map = MapView::new(value)?;
        Ok(Self {
            coin_type: map.get(coin_info_keys::COIN_TYPE).map(cbor::as_u32).transpose()?,
            network: map.get(coin_info_keys::NETWORK).map(cbor::as_u32).transpose()?,
        })
    }
}
