//! Reference model of a receive session.
//!
//! The model knows nothing about fountain coding. It tracks which
//! transmission owns the session and which sequence numbers were scanned,
//! which is enough to predict how the real decoder must classify every scan.

use std::collections::BTreeSet;

/// Which of two simultaneous transmissions a frame comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The transmission under test
    Primary,
    /// Another device in view
    Foreign,
}

/// One step of a generated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Scan part `seq_num` of `source`
    Scan {
        /// Transmission
        source: Source,
        /// Part sequence number
        seq_num: u32,
    },
    /// Scan part `seq_num` of the primary transmission with one body letter
    /// changed
    Corrupt {
        /// Part sequence number
        seq_num: u32,
        /// Selects the letter to change
        position: usize,
    },
    /// Start over
    Reset,
}

/// How the real receiver must respond to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// First scan of this part: accepted, with any outcome
    Accepted,
    /// Part scanned before: accepted as redundant, state unchanged
    Duplicate,
    /// Frame from the transmission that does not own the session
    MixedSessions,
    /// Frame is corrupt: rejected, state unchanged
    Rejected,
    /// Session discarded
    Reset,
}

/// Model of one receive session.
#[derive(Debug, Clone, Default)]
pub struct ModelSession {
    owner: Option<Source>,
    scanned: BTreeSet<u32>,
}

impl ModelSession {
    /// Empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `op` and return what the receiver must do.
    pub fn apply(&mut self, op: &Operation) -> Expectation {
        match *op {
            Operation::Scan { source, seq_num } => {
                if self.owner.is_some_and(|owner| owner != source) {
                    return Expectation::MixedSessions;
                }
                self.owner = Some(source);
                if self.scanned.insert(seq_num) { Expectation::Accepted } else { Expectation::Duplicate }
            },
            Operation::Corrupt { .. } => Expectation::Rejected,
            Operation::Reset => {
                *self = Self::default();
                Expectation::Reset
            },
        }
    }

    /// Transmission owning the session.
    pub fn owner(&self) -> Option<Source> {
        self.owner
    }

    /// Pure parts scanned so far, for a message of `seq_len` fragments. The
    /// real decoder has solved at least this many.
    pub fn pure_parts(&self, seq_len: usize) -> usize {
        self.scanned.range(1..=seq_len as u32).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_scan_decides_the_owner() {
        let mut model = ModelSession::new();
        let foreign = Operation::Scan { source: Source::Foreign, seq_num: 1 };
        let primary = Operation::Scan { source: Source::Primary, seq_num: 1 };

        assert_eq!(model.apply(&foreign), Expectation::Accepted);
        assert_eq!(model.apply(&primary), Expectation::MixedSessions);
        assert_eq!(model.apply(&foreign), Expectation::Duplicate);

        assert_eq!(model.apply(&Operation::Reset), Expectation::Reset);
        assert_eq!(model.apply(&primary), Expectation::Accepted);
        assert_eq!(model.owner(), Some(Source::Primary));
    }

    #[test]
    fn counts_only_pure_parts() {
        let mut model = ModelSession::new();
        for seq_num in [1, 3, 5, 9] {
            model.apply(&Operation::Scan { source: Source::Primary, seq_num });
        }
        assert_eq!(model.pure_parts(4), 2);
    }
}
