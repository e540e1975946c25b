//! Fountain encoder.
//!
//! Serves one message as an endless stream of [`Part`]s. The first
//! `seq_len` parts carry each fragment once; every later part is the XOR of a
//! pseudo-random subset chosen from `(seq_num, checksum)`. The checksum doubles
//! as the session identifier, so encoding the same message twice yields the
//! same stream.

use airgap_proto::{EncodeError, Part, crc32};

use crate::{
    config::EncoderConfig,
    fragments::{choose_fragments, fragment_len, partition, xor_into},
};

/// Stateful part generator for one message.
#[derive(Debug, Clone)]
pub struct FountainEncoder {
    fragments: Vec<Vec<u8>>,
    fragment_len: usize,
    message_len: usize,
    checksum: u32,
    /// Sequence number of the last part produced, 0 before the first
    seq_num: u32,
}

impl FountainEncoder {
    /// Split `message` according to `config`.
    pub fn new(message: &[u8], config: &EncoderConfig) -> Result<Self, EncodeError> {
        config.validate()?;
        if message.is_empty() {
            return Err(EncodeError::EmptyMessage);
        }

        let fragment_len = fragment_len(message.len(), config.max_fragment_len);
        let fragments = partition(message, fragment_len);
        let checksum = crc32(message);

        tracing::debug!(
            message_len = message.len(),
            fragment_len,
            seq_len = fragments.len(),
            checksum = format_args!("{checksum:#010x}"),
            "Fountain encoder ready"
        );

        Ok(Self { fragments, fragment_len, message_len: message.len(), checksum, seq_num: 0 })
    }

    /// Produce the next part.
    pub fn next_part(&mut self) -> Part {
        // Past u32::MAX the stream restarts; the decoder treats the repeats
        // as duplicates.
        self.seq_num = self.seq_num.checked_add(1).unwrap_or(1);
        self.part(self.seq_num)
    }

    /// Part `seq_num` of the stream, without advancing the encoder.
    pub fn part(&self, seq_num: u32) -> Part {
        let indexes = choose_fragments(seq_num, self.seq_len(), self.checksum);

        let mut data = vec![0u8; self.fragment_len];
        for fragment in indexes.iter().filter_map(|&i| self.fragments.get(i)) {
            xor_into(&mut data, fragment);
        }

        Part {
            seq_num,
            seq_len: self.seq_len(),
            message_len: self.message_len,
            checksum: self.checksum,
            data,
        }
    }

    /// Sequence number of the last part produced.
    pub fn seq_num(&self) -> u32 {
        self.seq_num
    }

    /// Number of fragments.
    pub fn seq_len(&self) -> usize {
        self.fragments.len()
    }

    /// Length of every fragment.
    pub fn fragment_len(&self) -> usize {
        self.fragment_len
    }

    /// Length of the unpadded message.
    pub fn message_len(&self) -> usize {
        self.message_len
    }

    /// CRC-32 of the message, also the session identifier.
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Whether the message fits in one fragment.
    pub fn is_single_part(&self) -> bool {
        self.fragments.len() == 1
    }

    /// Whether every pure part has been produced at least once.
    pub fn is_complete(&self) -> bool {
        self.seq_num as usize >= self.seq_len()
    }
}
