//! Fountain decoder.
//!
//! A peeling decoder over the fragment graph. Solved fragments are kept by
//! index; mixed parts that still cover two or more unknown fragments are kept
//! by their index set. Every new piece of information is pushed through a
//! work queue:
//!
//! ```text
//! part ──► reduce by solved fragments ──► one index left?  ──► solve it
//!                                          │                   │
//!                                          ▼                   ▼
//!                               reduce by / reduce pending   re-queue every pending
//!                               mixed parts (subset XOR)     part that covers it
//! ```
//!
//! Subset reduction goes beyond plain peeling: a pending `{1,2,3}` and a new
//! `{1,2}` yield `{3}` even though no single fragment was known.
//!
//! The first accepted part fixes the session header. Parts from another
//! transmission are rejected with [`DecodeError::MixedSessions`] before any
//! state is touched, so a stray scan never corrupts the current session.

use std::collections::{BTreeMap, VecDeque};

use airgap_proto::{DecodeError, Part, Result, crc32};

use crate::{
    config::DecoderConfig,
    fragments::{FragmentSet, choose_fragments, xor_into},
};

/// Fragments solved out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Fragments recovered so far
    pub solved: usize,
    /// Fragments in the message
    pub total: usize,
}

impl Progress {
    /// Solved fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.solved as f64 / self.total as f64 }
    }
}

/// Outcome of feeding one part to a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reception {
    /// Part was absorbed; the message is not recoverable yet
    Progress(Progress),
    /// Part carried nothing new (duplicate, already-known combination, or
    /// received after completion)
    Redundant,
    /// Every fragment is solved
    Complete,
}

/// Header shared by every part of one transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SessionHeader {
    seq_len: usize,
    message_len: usize,
    checksum: u32,
    fragment_len: usize,
}

impl SessionHeader {
    fn of(part: &Part) -> Self {
        Self {
            seq_len: part.seq_len,
            message_len: part.message_len,
            checksum: part.checksum,
            fragment_len: part.fragment_len(),
        }
    }
}

#[derive(Debug, Clone)]
struct Mixed {
    indexes: FragmentSet,
    data: Vec<u8>,
}

/// Reassembles one message from parts received in any order.
#[derive(Debug, Clone)]
pub struct FountainDecoder {
    config: DecoderConfig,
    header: Option<SessionHeader>,
    solved: BTreeMap<usize, Vec<u8>>,
    pending: BTreeMap<FragmentSet, Vec<u8>>,
    /// `seq_num` to CRC-32 of its data, to tell duplicates from conflicts.
    /// Holds every pure part and at most `max_pending_parts` mixed ones.
    seen_parts: BTreeMap<u32, u32>,
    pure_parts_seen: usize,
    accepted: usize,
}

impl FountainDecoder {
    /// Empty session.
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            header: None,
            solved: BTreeMap::new(),
            pending: BTreeMap::new(),
            seen_parts: BTreeMap::new(),
            pure_parts_seen: 0,
            accepted: 0,
        }
    }

    /// Feed one part.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::InvalidPart`] if the part header is inconsistent.
    /// - [`DecodeError::MixedSessions`] if the header differs from the
    ///   session's first part.
    /// - [`DecodeError::ConflictingPart`] if `seq_num` was seen before with
    ///   different data.
    /// - [`DecodeError::MessageTooLarge`] if the first part announces a message
    ///   beyond [`DecoderConfig::max_message_len`].
    /// - [`DecodeError::TooManyFragments`] if the first part announces more
    ///   fragments than [`DecoderConfig::max_fragment_count`].
    ///
    /// Errors leave the session unchanged.
    pub fn receive(&mut self, part: &Part) -> Result<Reception> {
        part.validate()?;

        let header = SessionHeader::of(part);
        match self.header {
            Some(expected) if expected != header => {
                tracing::warn!(
                    seq_num = part.seq_num,
                    checksum = format_args!("{:#010x}", part.checksum),
                    session_checksum = format_args!("{:#010x}", expected.checksum),
                    "Rejected part from another transmission"
                );
                return Err(DecodeError::MixedSessions);
            },
            Some(_) => {},
            None => {
                if header.message_len > self.config.max_message_len {
                    return Err(DecodeError::MessageTooLarge {
                        len: header.message_len,
                        max: self.config.max_message_len,
                    });
                }
                if header.seq_len > self.config.max_fragment_count {
                    return Err(DecodeError::TooManyFragments {
                        count: header.seq_len,
                        max: self.config.max_fragment_count,
                    });
                }
            },
        }

        let data_crc = crc32(&part.data);
        if let Some(&previous) = self.seen_parts.get(&part.seq_num) {
            if previous != data_crc {
                tracing::warn!(seq_num = part.seq_num, "Rejected conflicting part");
                return Err(DecodeError::ConflictingPart { seq_num: part.seq_num });
            }
            return Ok(Reception::Redundant);
        }

        if self.header.is_none() {
            tracing::debug!(
                seq_len = header.seq_len,
                message_len = header.message_len,
                checksum = format_args!("{:#010x}", header.checksum),
                "Fountain session started"
            );
            self.header = Some(header);
        }

        if self.is_complete() {
            return Ok(Reception::Redundant);
        }
        self.remember(part.seq_num, data_crc, header.seq_len);

        let indexes = choose_fragments(part.seq_num, header.seq_len, header.checksum);

        let before = (self.solved.len(), self.pending.len());
        let absorbed = self.absorb(Mixed { indexes, data: part.data.clone() });
        self.accepted += 1;

        tracing::trace!(
            seq_num = part.seq_num,
            solved = self.solved.len(),
            pending = self.pending.len(),
            "Accepted part"
        );

        if self.is_complete() {
            tracing::debug!(
                parts = self.accepted,
                seq_len = header.seq_len,
                "Fountain session complete"
            );
            return Ok(Reception::Complete);
        }

        if absorbed || before != (self.solved.len(), self.pending.len()) {
            Ok(Reception::Progress(self.progress()))
        } else {
            Ok(Reception::Redundant)
        }
    }

    /// Record `seq_num` for duplicate detection. Pure parts are always kept;
    /// beyond the pending limit the lowest-numbered mixed part is forgotten
    /// and is processed anew if scanned again.
    fn remember(&mut self, seq_num: u32, data_crc: u32, seq_len: usize) {
        self.seen_parts.insert(seq_num, data_crc);
        if seq_num as usize <= seq_len {
            self.pure_parts_seen += 1;
            return;
        }

        if self.seen_parts.len() - self.pure_parts_seen > self.config.max_pending_parts {
            let first_mixed = seq_len as u32 + 1;
            if let Some(oldest) = self.seen_parts.range(first_mixed..).next().map(|(k, _)| *k) {
                self.seen_parts.remove(&oldest);
            }
        }
    }

    /// Run `part` and everything it unlocks through the peeling queue.
    ///
    /// Returns whether `part` itself contributed anything.
    fn absorb(&mut self, part: Mixed) -> bool {
        let mut queue = VecDeque::from([part]);
        let mut first = true;
        let mut contributed = false;

        while let Some(mut item) = queue.pop_front() {
            self.reduce_by_solved(&mut item);

            let useful = match item.indexes.len() {
                0 => false,
                1 => self.solve(item, &mut queue),
                _ => self.hold(item, &mut queue),
            };

            if first {
                contributed = useful;
                first = false;
            }
        }

        contributed
    }

    fn reduce_by_solved(&self, item: &mut Mixed) {
        let known: Vec<usize> =
            item.indexes.iter().copied().filter(|i| self.solved.contains_key(i)).collect();
        for index in known {
            if let Some(fragment) = self.solved.get(&index) {
                xor_into(&mut item.data, fragment);
            }
            item.indexes.remove(&index);
        }
    }

    fn solve(&mut self, item: Mixed, queue: &mut VecDeque<Mixed>) -> bool {
        let Some(&index) = item.indexes.first() else { return false };
        if self.solved.contains_key(&index) {
            return false;
        }
        self.solved.insert(index, item.data);

        // Cascade: every pending part covering the new fragment shrinks.
        let affected: Vec<FragmentSet> =
            self.pending.keys().filter(|set| set.contains(&index)).cloned().collect();
        for indexes in affected {
            if let Some(data) = self.pending.remove(&indexes) {
                queue.push_back(Mixed { indexes, data });
            }
        }
        true
    }

    fn hold(&mut self, mut item: Mixed, queue: &mut VecDeque<Mixed>) -> bool {
        if self.pending.contains_key(&item.indexes) {
            return false;
        }

        // Strip every pending subset out of the new part.
        for (indexes, data) in &self.pending {
            if indexes.is_subset(&item.indexes) {
                item.indexes.retain(|i| !indexes.contains(i));
                xor_into(&mut item.data, data);
            }
        }

        match item.indexes.len() {
            0 => return false,
            1 => {
                queue.push_back(item);
                return true;
            },
            _ => {},
        }
        if self.pending.contains_key(&item.indexes) {
            return false;
        }

        // Strip the new part out of every pending superset.
        let supersets: Vec<FragmentSet> = self
            .pending
            .keys()
            .filter(|set| item.indexes.is_subset(set) && **set != item.indexes)
            .cloned()
            .collect();
        for indexes in supersets {
            if let Some(mut data) = self.pending.remove(&indexes) {
                xor_into(&mut data, &item.data);
                let reduced: FragmentSet = indexes.difference(&item.indexes).copied().collect();
                queue.push_back(Mixed { indexes: reduced, data });
            }
        }

        if self.pending.len() >= self.config.max_pending_parts {
            tracing::trace!(limit = self.config.max_pending_parts, "Pending part limit reached");
            return false;
        }
        self.pending.insert(item.indexes, item.data);
        true
    }

    /// Whether every fragment is solved.
    pub fn is_complete(&self) -> bool {
        self.header.is_some_and(|h| self.solved.len() == h.seq_len)
    }

    /// Solved fragments out of the total (0/0 before the first part).
    pub fn progress(&self) -> Progress {
        Progress { solved: self.solved.len(), total: self.header.map_or(0, |h| h.seq_len) }
    }

    /// Rough completion estimate in `[0, 1]`.
    ///
    /// Counts accepted parts against the usual overhead of a fountain stream
    /// (about 1.75 parts per fragment), capped below 1 until complete.
    pub fn estimated_percent_complete(&self) -> f64 {
        if self.is_complete() {
            return 1.0;
        }
        match self.header {
            None => 0.0,
            Some(h) => {
                let estimate = self.accepted as f64 / (h.seq_len as f64 * 1.75);
                estimate.min(0.99)
            },
        }
    }

    /// Limits this decoder enforces.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Number of fragments, once known.
    pub fn seq_len(&self) -> Option<usize> {
        self.header.map(|h| h.seq_len)
    }

    /// Checksum identifying the current session, once known.
    pub fn checksum(&self) -> Option<u32> {
        self.header.map(|h| h.checksum)
    }

    /// Number of mixed parts waiting on unknown fragments.
    pub fn pending_parts(&self) -> usize {
        self.pending.len()
    }

    /// Reassembled message.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Incomplete`] before every fragment is solved.
    /// - [`DecodeError::ChecksumMismatch`] if the reassembled bytes do not hash
    ///   to the transmitted checksum.
    pub fn message(&self) -> Result<Vec<u8>> {
        let header = self.header.ok_or(DecodeError::Incomplete)?;
        if !self.is_complete() {
            return Err(DecodeError::Incomplete);
        }

        let mut message = Vec::with_capacity(header.seq_len * header.fragment_len);
        for fragment in self.solved.values() {
            message.extend_from_slice(fragment);
        }
        message.truncate(header.message_len);

        let actual = crc32(&message);
        if actual != header.checksum {
            return Err(DecodeError::ChecksumMismatch { expected: header.checksum, actual });
        }

        Ok(message)
    }

    /// Discard the session and start over.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

impl Default for FountainDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}
