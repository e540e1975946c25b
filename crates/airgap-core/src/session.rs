//! UR sessions: fountain coding plus `ur:` framing.
//!
//! [`UrEncoder`] turns one message into an endless series of UR strings;
//! [`UrDecoder`] consumes UR strings until the message is whole. Both are
//! plain owned values: a host decoding two transmissions at once keeps two
//! decoders.

use airgap_proto::{DecodeError, EncodeError, Result, Ur, UrBody, UrType, encode_part};

use crate::{
    config::{DecoderConfig, EncoderConfig},
    decoder::{FountainDecoder, Progress, Reception},
    encoder::FountainEncoder,
};

/// Produces UR part strings for one message.
#[derive(Debug, Clone)]
pub struct UrEncoder {
    ur_type: UrType,
    fountain: FountainEncoder,
}

impl UrEncoder {
    /// Encoder for `message` of type `ur_type`.
    pub fn new(ur_type: UrType, message: &[u8], config: &EncoderConfig) -> Result<Self, EncodeError> {
        let fountain = FountainEncoder::new(message, config)?;
        Ok(Self { ur_type, fountain })
    }

    /// Next part, always in multi-part framing (`1-1` for short messages).
    pub fn next_part(&mut self) -> Result<String, EncodeError> {
        let part = self.fountain.next_part();
        encode_part(&self.ur_type, &part)
    }

    /// Message type.
    pub fn ur_type(&self) -> &UrType {
        &self.ur_type
    }

    /// Sequence number of the last part produced.
    pub fn seq_num(&self) -> u32 {
        self.fountain.seq_num()
    }

    /// Number of fragments.
    pub fn seq_len(&self) -> usize {
        self.fountain.seq_len()
    }

    /// Whether every pure part has been produced at least once.
    pub fn is_complete(&self) -> bool {
        self.fountain.is_complete()
    }
}

/// A message recovered by a [`UrDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Type carried by the transmission
    pub ur_type: UrType,
    /// Message bytes (registry CBOR)
    pub message: Vec<u8>,
}

/// Collects UR strings until one message is whole.
#[derive(Debug, Clone)]
pub struct UrDecoder {
    expected_type: Option<UrType>,
    session_type: Option<UrType>,
    single: Option<Vec<u8>>,
    fountain: FountainDecoder,
}

impl UrDecoder {
    /// Decoder accepting any message type.
    pub fn new(config: DecoderConfig) -> Self {
        Self { expected_type: None, session_type: None, single: None, fountain: FountainDecoder::new(config) }
    }

    /// Decoder that only accepts `ur_type`.
    pub fn expecting(ur_type: UrType, config: DecoderConfig) -> Self {
        Self { expected_type: Some(ur_type), ..Self::new(config) }
    }

    /// Feed one scanned string.
    ///
    /// # Errors
    ///
    /// - Parse failures from [`Ur::parse`].
    /// - [`DecodeError::TypeMismatch`] if the decoder expects another type.
    /// - [`DecodeError::MixedSessions`] if the string belongs to a different
    ///   transmission than the one in progress.
    /// - [`DecodeError::MessageTooLarge`] if a single-part message exceeds
    ///   [`DecoderConfig::max_message_len`].
    /// - Anything [`FountainDecoder::receive`] reports.
    ///
    /// On error the session is unchanged.
    pub fn receive(&mut self, text: &str) -> Result<Reception> {
        let ur = Ur::parse(text)?;

        if let Some(expected) = &self.expected_type
            && *expected != ur.ur_type
        {
            return Err(DecodeError::TypeMismatch {
                expected: expected.to_string(),
                actual: ur.ur_type.to_string(),
            });
        }
        if let Some(session) = &self.session_type
            && *session != ur.ur_type
        {
            tracing::warn!(
                session = %session,
                received = %ur.ur_type,
                "Rejected part of another message type"
            );
            return Err(DecodeError::MixedSessions);
        }

        let reception = match ur.body {
            UrBody::Single(message) => self.receive_single(message)?,
            UrBody::Multi(part) => {
                if self.single.is_some() {
                    return Err(DecodeError::MixedSessions);
                }
                self.fountain.receive(&part)?
            },
        };

        if self.session_type.is_none() {
            self.session_type = Some(ur.ur_type);
        }
        Ok(reception)
    }

    fn receive_single(&mut self, message: Vec<u8>) -> Result<Reception> {
        if self.fountain.seq_len().is_some() {
            return Err(DecodeError::MixedSessions);
        }
        let max = self.fountain.config().max_message_len;
        if message.len() > max {
            return Err(DecodeError::MessageTooLarge { len: message.len(), max });
        }
        match &self.single {
            Some(existing) if *existing == message => Ok(Reception::Redundant),
            Some(_) => Err(DecodeError::MixedSessions),
            None => {
                tracing::debug!(message_len = message.len(), "Single-part message received");
                self.single = Some(message);
                Ok(Reception::Complete)
            },
        }
    }

    /// Whether the message is whole.
    pub fn is_complete(&self) -> bool {
        self.single.is_some() || self.fountain.is_complete()
    }

    /// Solved fragments out of the total.
    pub fn progress(&self) -> Progress {
        if self.single.is_some() {
            return Progress { solved: 1, total: 1 };
        }
        self.fountain.progress()
    }

    /// Rough completion estimate in `[0, 1]`.
    pub fn estimated_percent_complete(&self) -> f64 {
        if self.single.is_some() { 1.0 } else { self.fountain.estimated_percent_complete() }
    }

    /// Type of the transmission in progress, once known.
    pub fn ur_type(&self) -> Option<&UrType> {
        self.session_type.as_ref()
    }

    /// Recovered message and its type.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Incomplete`] before completion,
    /// [`DecodeError::ChecksumMismatch`] if reassembly is corrupt.
    pub fn resolve(&self) -> Result<Resolved> {
        let ur_type = self.session_type.clone().ok_or(DecodeError::Incomplete)?;
        let message = match &self.single {
            Some(message) => message.clone(),
            None => self.fountain.message()?,
        };
        Ok(Resolved { ur_type, message })
    }

    /// Recovered message, which must be of type `expected`.
    pub fn resolve_as(&self, expected: &UrType) -> Result<Vec<u8>> {
        let resolved = self.resolve()?;
        if resolved.ur_type != *expected {
            return Err(DecodeError::TypeMismatch {
                expected: expected.to_string(),
                actual: resolved.ur_type.to_string(),
            });
        }
        Ok(resolved.message)
    }

    /// Discard the session. The expected type, if any, is kept.
    pub fn reset(&mut self) {
        self.session_type = None;
        self.single = None;
        self.fountain.reset();
    }
}

impl Default for UrDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use airgap_proto::encode_single;

    use super::*;

    fn bytes_type() -> UrType {
        UrType::new("bytes").unwrap()
    }

    fn message() -> Vec<u8> {
        (0..=255u8).cycle().take(700).collect()
    }

    #[test]
    fn multi_part_round_trip() {
        let message = message();
        let mut encoder =
            UrEncoder::new(bytes_type(), &message, &EncoderConfig::with_max_fragment_len(100)).unwrap();
        let mut decoder = UrDecoder::default();

        let mut parts = 0;
        while !decoder.is_complete() {
            decoder.receive(&encoder.next_part().unwrap()).unwrap();
            parts += 1;
        }

        assert_eq!(parts, encoder.seq_len());
        assert_eq!(decoder.resolve().unwrap(), Resolved { ur_type: bytes_type(), message });
    }

    #[test]
    fn short_message_still_uses_multi_part_framing() {
        let mut encoder = UrEncoder::new(bytes_type(), b"\x43abc", &EncoderConfig::default()).unwrap();
        assert!(encoder.next_part().unwrap().starts_with("UR:BYTES/1-1/"));
        assert!(encoder.next_part().unwrap().starts_with("UR:BYTES/2-1/"));
    }

    #[test]
    fn single_part_string_completes_immediately() {
        let mut decoder = UrDecoder::default();
        let text = encode_single(&bytes_type(), b"\x43abc");

        assert_eq!(decoder.receive(&text).unwrap(), Reception::Complete);
        assert_eq!(decoder.receive(&text).unwrap(), Reception::Redundant);
        assert_eq!(decoder.progress(), Progress { solved: 1, total: 1 });
        assert_eq!(decoder.resolve_as(&bytes_type()).unwrap(), b"\x43abc");
    }

    #[test]
    fn oversized_single_part_message_is_refused() {
        let config = DecoderConfig { max_message_len: 8, ..DecoderConfig::default() };
        let mut decoder = UrDecoder::new(config);
        let text = encode_single(&bytes_type(), &[0x4c; 12]);

        assert_eq!(decoder.receive(&text), Err(DecodeError::MessageTooLarge { len: 12, max: 8 }));
        assert!(!decoder.is_complete());
        assert_eq!(decoder.ur_type(), None);

        decoder.receive(&encode_single(&bytes_type(), b"\x43abc")).unwrap();
        assert!(decoder.is_complete());
    }

    #[test]
    fn expected_type_is_enforced_per_part() {
        let mut encoder =
            UrEncoder::new(bytes_type(), &message(), &EncoderConfig::default()).unwrap();
        let mut decoder =
            UrDecoder::expecting(UrType::new("crypto-hdkey").unwrap(), DecoderConfig::default());

        let err = decoder.receive(&encoder.next_part().unwrap()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch { expected: "crypto-hdkey".into(), actual: "bytes".into() }
        );
        assert_eq!(decoder.ur_type(), None);
    }

    #[test]
    fn type_change_mid_session_is_mixed() {
        let message = message();
        let config = EncoderConfig::with_max_fragment_len(100);
        let mut first = UrEncoder::new(bytes_type(), &message, &config).unwrap();
        let mut second = UrEncoder::new(UrType::new("other").unwrap(), &message, &config).unwrap();
        let mut decoder = UrDecoder::default();

        decoder.receive(&first.next_part().unwrap()).unwrap();
        second.next_part().unwrap();
        assert_eq!(
            decoder.receive(&second.next_part().unwrap()),
            Err(DecodeError::MixedSessions)
        );
    }

    #[test]
    fn resolve_before_completion_is_incomplete() {
        let mut encoder = UrEncoder::new(bytes_type(), &message(), &EncoderConfig::default()).unwrap();
        let mut decoder = UrDecoder::default();
        assert_eq!(decoder.resolve(), Err(DecodeError::Incomplete));

        decoder.receive(&encoder.next_part().unwrap()).unwrap();
        assert_eq!(decoder.resolve(), Err(DecodeError::Incomplete));
    }

    #[test]
    fn resolve_as_checks_type() {
        let mut decoder = UrDecoder::default();
        decoder.receive(&encode_single(&bytes_type(), b"\x40")).unwrap();
        assert!(matches!(
            decoder.resolve_as(&UrType::new("eth-signature").unwrap()),
            Err(DecodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn reset_accepts_a_new_message_type() {
        let mut decoder = UrDecoder::default();
        decoder.receive(&encode_single(&bytes_type(), b"\x40")).unwrap();
        decoder.reset();
        assert!(!decoder.is_complete());

        let other = UrType::new("other").unwrap();
        decoder.receive(&encode_single(&other, b"\x41\x00")).unwrap();
        assert_eq!(decoder.resolve_as(&other).unwrap(), b"\x41\x00");
    }
}
