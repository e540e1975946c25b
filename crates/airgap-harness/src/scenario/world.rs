//! World state for scenario execution.
//!
//! The World records what happened while a scenario ran: frames shown and
//! captured, rejections, when the receiver completed, and what it resolved.
//! Oracles read it after the run.

use airgap_core::Progress;
use airgap_proto::DecodeError;
use airgap_registry::Record;

use crate::channel::ChannelStats;

/// Everything observable about one scenario run.
#[derive(Debug, Clone)]
pub struct World {
    expected: Record,
    seq_len: usize,
    frames_shown: usize,
    captures_accepted: usize,
    rejections: Vec<DecodeError>,
    interference_shown: usize,
    completed_after: Option<usize>,
    progress: Progress,
    resolved: Option<Result<Record, DecodeError>>,
    channel: ChannelStats,
}

impl World {
    /// World for a transmission of `expected` in `seq_len` fragments.
    pub fn new(expected: Record, seq_len: usize) -> Self {
        Self {
            expected,
            seq_len,
            frames_shown: 0,
            captures_accepted: 0,
            rejections: Vec::new(),
            interference_shown: 0,
            completed_after: None,
            progress: Progress { solved: 0, total: 0 },
            resolved: None,
            channel: ChannelStats::default(),
        }
    }

    /// Record that the transmitter showed a frame.
    pub fn record_frame_shown(&mut self) {
        self.frames_shown += 1;
    }

    /// Record that a frame of the interfering device was shown.
    pub fn record_interference_shown(&mut self) {
        self.interference_shown += 1;
    }

    /// Record that the receiver accepted a capture.
    pub fn record_accepted(&mut self, progress: Progress) {
        self.captures_accepted += 1;
        self.progress = progress;
    }

    /// Record that the receiver rejected a capture.
    pub fn record_rejection(&mut self, err: DecodeError) {
        self.rejections.push(err);
    }

    /// Record completion, once.
    pub fn record_complete(&mut self) {
        if self.completed_after.is_none() {
            self.completed_after = Some(self.frames_shown);
        }
    }

    /// Record the final resolution and channel counters.
    pub fn finish(&mut self, resolved: Result<Record, DecodeError>, channel: ChannelStats) {
        self.resolved = Some(resolved);
        self.channel = channel;
    }

    /// Record that was transmitted.
    pub fn expected(&self) -> &Record {
        &self.expected
    }

    /// Fragments in the transmission.
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Frames the transmitter showed.
    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }

    /// Frames the interfering device showed.
    pub fn interference_shown(&self) -> usize {
        self.interference_shown
    }

    /// Captures the receiver accepted, redundant ones included.
    pub fn captures_accepted(&self) -> usize {
        self.captures_accepted
    }

    /// Every rejection, in order.
    pub fn rejections(&self) -> &[DecodeError] {
        &self.rejections
    }

    /// Frames shown when the receiver completed.
    pub fn completed_after(&self) -> Option<usize> {
        self.completed_after
    }

    /// Last progress reported by the receiver.
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Channel counters at the end of the run.
    pub fn channel(&self) -> ChannelStats {
        self.channel
    }

    /// What the receiver resolved, if the run finished.
    pub fn resolved(&self) -> Option<&Result<Record, DecodeError>> {
        self.resolved.as_ref()
    }

    /// Check that the receiver completed and resolved exactly the
    /// transmitted record.
    pub fn delivered_intact(&self) -> Result<(), String> {
        match &self.resolved {
            Some(Ok(record)) if *record == self.expected => Ok(()),
            Some(Ok(record)) => Err(format!("resolved a different record: {record:?}")),
            Some(Err(err)) => Err(format!(
                "resolve failed after {} frames ({}/{} solved): {err}",
                self.frames_shown, self.progress.solved, self.progress.total
            )),
            None => Err("scenario did not finish".into()),
        }
    }

    /// Check that every rejection was a stray frame from another
    /// transmission.
    pub fn only_mixed_session_rejections(&self) -> Result<(), String> {
        match self.rejections.iter().find(|err| **err != DecodeError::MixedSessions) {
            Some(err) => Err(format!("unexpected rejection: {err}")),
            None => Ok(()),
        }
    }
}
