//! Session configuration.
//!
//! Both structs deserialize with defaults for missing fields, so a host can
//! embed them in its own config file and override only what it needs.

use airgap_proto::EncodeError;
use serde::{Deserialize, Serialize};

/// Fountain encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Largest fragment carried by one part.
    ///
    /// The effective fragment length is balanced so every fragment has the
    /// same size, so it may come out smaller than this.
    ///
    /// Default: 200
    pub max_fragment_len: usize,

    /// Smallest `max_fragment_len` accepted.
    ///
    /// Default: 10
    pub min_fragment_len: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { max_fragment_len: 200, min_fragment_len: 10 }
    }
}

impl EncoderConfig {
    /// Config with a specific maximum fragment length.
    pub fn with_max_fragment_len(max_fragment_len: usize) -> Self {
        Self { max_fragment_len, ..Self::default() }
    }

    /// Reject fragment lengths that are zero or below the minimum.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.max_fragment_len == 0 || self.max_fragment_len < self.min_fragment_len {
            return Err(EncodeError::InvalidFragmentLength {
                len: self.max_fragment_len,
                min: self.min_fragment_len,
            });
        }
        Ok(())
    }
}

/// Fountain decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Largest message a session will reassemble.
    ///
    /// Checked against the first part's header before anything is allocated.
    ///
    /// Default: 1 MiB
    pub max_message_len: usize,

    /// Most mixed parts held while waiting for fragments to peel.
    ///
    /// Parts beyond this are dropped; the encoder keeps producing new ones.
    ///
    /// Default: 4096
    pub max_pending_parts: usize,

    /// Most fragments a session will accept.
    ///
    /// Choosing the fragments of a mixed part costs time in the fragment
    /// count, so a forged header with a huge count and one-byte fragments is
    /// refused before any mixing work.
    ///
    /// Default: 10000
    pub max_fragment_count: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { max_message_len: 1024 * 1024, max_pending_parts: 4096, max_fragment_count: 10_000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.max_fragment_len, 200);
        assert!(config.validate().is_ok());

        let config = DecoderConfig::default();
        assert_eq!(config.max_message_len, 1 << 20);
        assert_eq!(config.max_pending_parts, 4096);
        assert_eq!(config.max_fragment_count, 10_000);
    }

    #[test]
    fn fragment_length_below_minimum_is_rejected() {
        let config = EncoderConfig::with_max_fragment_len(4);
        assert_eq!(config.validate(), Err(EncodeError::InvalidFragmentLength { len: 4, min: 10 }));

        let config = EncoderConfig { max_fragment_len: 0, min_fragment_len: 0 };
        assert!(config.validate().is_err());
    }
}
