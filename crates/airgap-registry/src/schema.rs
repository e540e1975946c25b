//! Registry schema versions.
//!
//! The HD key record grew two optional fields over time: a `name` and a
//! `note` describing which wallet derivation scheme produced it. Decoding
//! always accepts both shapes. Encoding is driven by [`Capabilities`], so a
//! host talking to an older peer can leave the newer fields out instead of
//! changing field types between releases.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Optional fields an encoder may emit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capabilities: u32 {
        /// `note` (map key 10) on crypto-hdkey
        const HDKEY_NOTE = 0b0001;
        /// `name` (map key 9) on crypto-hdkey
        const HDKEY_NAME = 0b0010;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        SchemaVersion::default().capabilities()
    }
}

/// Named capability sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// Key material and origin only
    V1,
    /// Adds HD key `name` and `note`
    #[default]
    V2,
}

impl SchemaVersion {
    /// Fields this version may carry.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::V1 => Capabilities::empty(),
            Self::V2 => Capabilities::HDKEY_NOTE.union(Capabilities::HDKEY_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_newest_schema() {
        assert_eq!(Capabilities::default(), Capabilities::all());
        assert_eq!(SchemaVersion::V1.capabilities(), Capabilities::empty());
    }
}
