//! CBOR tags and map keys of the registry types.
//!
//! Tags follow BCR-2020-006 (UR types), BCR-2020-007 (HD keys), BCR-2020-010
//! (output descriptors), BCR-2020-015 (accounts) and the Ethereum extension
//! used by signing devices.

/// uuid (RFC 4122 byte form), used for request ids
pub const UUID: u64 = 37;

/// crypto-hdkey
pub const HDKEY: u64 = 303;

/// crypto-keypath
pub const KEYPATH: u64 = 304;

/// crypto-coin-info
pub const COIN_INFO: u64 = 305;

/// crypto-output
pub const OUTPUT: u64 = 308;

/// crypto-account
pub const ACCOUNT: u64 = 311;

/// eth-sign-request
pub const ETH_SIGN_REQUEST: u64 = 401;

/// eth-signature
pub const ETH_SIGNATURE: u64 = 402;

// Script expressions (BCR-2020-010). They share the 4xx range with the
// Ethereum records but only ever appear inside crypto-output.
/// sh
pub const SCRIPT_HASH: u64 = 400;
/// wsh
pub const WITNESS_SCRIPT_HASH: u64 = 401;
/// pk
pub const PUBLIC_KEY: u64 = 402;
/// pkh
pub const PUBLIC_KEY_HASH: u64 = 403;
/// wpkh
pub const WITNESS_PUBLIC_KEY_HASH: u64 = 404;
/// combo
pub const COMBO: u64 = 405;
/// multi (not supported: wraps several keys)
pub const MULTISIG: u64 = 406;
/// sortedmulti (not supported: wraps several keys)
pub const SORTED_MULTISIG: u64 = 407;
/// raw
pub const RAW_SCRIPT: u64 = 408;
/// tr
pub const TAPROOT: u64 = 409;
/// cosigner
pub const COSIGNER: u64 = 410;

/// Map keys of crypto-hdkey
#[allow(missing_docs)]
pub mod hdkey_keys {
    pub const IS_MASTER: u64 = 1;
    pub const IS_PRIVATE: u64 = 2;
    pub const KEY_DATA: u64 = 3;
    pub const CHAIN_CODE: u64 = 4;
    pub const USE_INFO: u64 = 5;
    pub const ORIGIN: u64 = 6;
    pub const CHILDREN: u64 = 7;
    pub const PARENT_FINGERPRINT: u64 = 8;
    pub const NAME: u64 = 9;
    pub const NOTE: u64 = 10;
}

/// Map keys of crypto-keypath
#[allow(missing_docs)]
pub mod keypath_keys {
    pub const COMPONENTS: u64 = 1;
    pub const SOURCE_FINGERPRINT: u64 = 2;
    pub const DEPTH: u64 = 3;
}

/// Map keys of crypto-coin-info
#[allow(missing_docs)]
pub mod coin_info_keys {
    pub const COIN_TYPE: u64 = 1;
    pub const NETWORK: u64 = 2;
}

/// Map keys of crypto-account
#[allow(missing_docs)]
pub mod account_keys {
    pub const MASTER_FINGERPRINT: u64 = 1;
    pub const OUTPUT_DESCRIPTORS: u64 = 2;
}

/// Map keys of eth-sign-request
#[allow(missing_docs)]
pub mod eth_sign_request_keys {
    pub const REQUEST_ID: u64 = 1;
    pub const SIGN_DATA: u64 = 2;
    pub const DATA_TYPE: u64 = 3;
    pub const CHAIN_ID: u64 = 4;
    pub const DERIVATION_PATH: u64 = 5;
    pub const ADDRESS: u64 = 6;
    pub const ORIGIN: u64 = 7;
}

/// Map keys of eth-signature
#[allow(missing_docs)]
pub mod eth_signature_keys {
    pub const REQUEST_ID: u64 = 1;
    pub const SIGNATURE: u64 = 2;
    pub const ORIGIN: u64 = 3;
}

/// Byte lengths fixed by the registry
pub mod lengths {
    /// Compressed public key, or private key with a leading zero
    pub const KEY_DATA: usize = 33;
    /// BIP-32 chain code
    pub const CHAIN_CODE: usize = 32;
    /// Request id (UUID)
    pub const REQUEST_ID: usize = 16;
    /// Ethereum address
    pub const ADDRESS: usize = 20;
    /// Recoverable ECDSA signature r || s || v
    pub const SIGNATURE: usize = 65;
}
