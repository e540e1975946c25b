//! Typed transmit and receive sessions.
//!
//! A [`Transmitter`] serves one record as an endless cycle of UR part
//! strings. A [`Receiver`] takes scanned strings until a record is whole and
//! hands it back typed. Both are owned values: hosts keep one per
//! transmission, and independent transmissions never share state.

use airgap_core::{DecoderConfig, EncoderConfig, Progress, Reception, UrDecoder, UrEncoder};
use airgap_proto::{DecodeError, EncodeError, Result, UrType};

use crate::{record::Record, registry_type::RegistryType};

/// Serves one record as UR parts.
#[derive(Debug, Clone)]
pub struct Transmitter {
    encoder: UrEncoder,
}

impl Transmitter {
    /// Transmitter for `record`.
    pub fn new<T: RegistryType>(record: &T, config: &EncoderConfig) -> Result<Self, EncodeError> {
        Self::from_message(T::UR_TYPE, &record.to_bytes()?, config)
    }

    /// Transmitter for a record of dynamic type.
    pub fn for_record(record: &Record, config: &EncoderConfig) -> Result<Self, EncodeError> {
        Self::from_message(record.ur_type(), &record.to_bytes()?, config)
    }

    fn from_message(ur_type: &str, message: &[u8], config: &EncoderConfig) -> Result<Self, EncodeError> {
        let encoder = UrEncoder::new(UrType::new(ur_type)?, message, config)?;
        tracing::debug!(ur_type, seq_len = encoder.seq_len(), "Transmitter ready");
        Ok(Self { encoder })
    }

    /// Next UR string. Never runs out.
    pub fn next_part(&mut self) -> Result<String, EncodeError> {
        self.encoder.next_part()
    }

    /// Number of fragments.
    pub fn seq_len(&self) -> usize {
        self.encoder.seq_len()
    }

    /// Whether every fragment has been shown once.
    pub fn is_complete(&self) -> bool {
        self.encoder.is_complete()
    }
}

/// Collects UR strings into one record.
#[derive(Debug, Clone, Default)]
pub struct Receiver {
    decoder: UrDecoder,
}

impl Receiver {
    /// Receiver accepting any registry type.
    pub fn new(config: DecoderConfig) -> Self {
        Self { decoder: UrDecoder::new(config) }
    }

    /// Feed one scanned string. See [`UrDecoder::receive`].
    pub fn receive(&mut self, text: &str) -> Result<Reception> {
        self.decoder.receive(text)
    }

    /// Whether the message is whole.
    pub fn is_complete(&self) -> bool {
        self.decoder.is_complete()
    }

    /// Solved fragments out of the total.
    pub fn progress(&self) -> Progress {
        self.decoder.progress()
    }

    /// Rough completion estimate in `[0, 1]`.
    pub fn estimated_percent_complete(&self) -> f64 {
        self.decoder.estimated_percent_complete()
    }

    /// The received record as `T`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Incomplete`] before completion,
    /// [`DecodeError::TypeMismatch`] if the transmission is another type,
    /// [`DecodeError::ChecksumMismatch`] on corrupt reassembly, and the
    /// decode errors of `T`.
    pub fn resolve<T: RegistryType>(&self) -> Result<T> {
        let resolved = self.decoder.resolve()?;
        if resolved.ur_type.as_str() != T::UR_TYPE {
            return Err(DecodeError::TypeMismatch {
                expected: T::UR_TYPE.to_owned(),
                actual: resolved.ur_type.to_string(),
            });
        }
        let record = T::from_bytes(&resolved.message)?;
        tracing::debug!(ur_type = T::UR_TYPE, message_len = resolved.message.len(), "Record resolved");
        Ok(record)
    }

    /// The received record, whichever registry type it is.
    pub fn resolve_record(&self) -> Result<Record> {
        let resolved = self.decoder.resolve()?;
        Record::from_ur_message(resolved.ur_type.as_str(), &resolved.message)
    }

    /// Discard the session and start over.
    pub fn reset(&mut self) {
        self.decoder.reset();
    }
}

/// Single-part UR string for `record`.
pub fn encode_single<T: RegistryType>(record: &T) -> Result<String, EncodeError> {
    Ok(airgap_proto::encode_single(&UrType::new(T::UR_TYPE)?, &record.to_bytes()?))
}

/// Decode a record that fits in one UR string, single-part or `1-1`.
pub fn decode_single<T: RegistryType>(text: &str) -> Result<T> {
    let mut receiver = Receiver::default();
    receiver.receive(text)?;
    receiver.resolve()
}
