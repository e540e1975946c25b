//! Simulated camera-to-screen channel.
//!
//! A display cycles through frames; a camera captures some of them. Frames
//! get missed (motion blur, focus), captured twice (the display lingers), or
//! arrive out of order when a host decodes frames on several threads. All
//! randomness comes from a seeded ChaCha RNG, so a failing seed replays
//! exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Channel construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ChannelError {
    /// A fault rate is not a probability
    #[error("{name} must be within [0, 1], got {rate}")]
    InvalidRate {
        /// Field holding the rate
        name: &'static str,
        /// Rejected value
        rate: f64,
    },
}

/// Fault rates of the channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConditions {
    /// Probability that a shown frame is never captured
    pub loss_rate: f64,
    /// Probability that a captured frame is delivered twice
    pub duplicate_rate: f64,
    /// Frames held back before release; 0 keeps display order
    pub reorder_window: usize,
}

impl ChannelConditions {
    /// Every frame captured once, in order.
    pub const fn perfect() -> Self {
        Self { loss_rate: 0.0, duplicate_rate: 0.0, reorder_window: 0 }
    }

    /// In-order channel that misses `loss_rate` of frames.
    pub const fn lossy(loss_rate: f64) -> Self {
        Self { loss_rate, ..Self::perfect() }
    }

    /// Add duplicate captures.
    #[must_use]
    pub const fn with_duplicates(mut self, duplicate_rate: f64) -> Self {
        self.duplicate_rate = duplicate_rate;
        self
    }

    /// Add reordering within a window of `reorder_window` frames.
    #[must_use]
    pub const fn with_reordering(mut self, reorder_window: usize) -> Self {
        self.reorder_window = reorder_window;
        self
    }

    /// Check that both rates are probabilities.
    ///
    /// # Errors
    ///
    /// [`ChannelError::InvalidRate`] naming the first rate outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ChannelError> {
        for (name, rate) in [("loss_rate", self.loss_rate), ("duplicate_rate", self.duplicate_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ChannelError::InvalidRate { name, rate });
            }
        }
        Ok(())
    }
}

impl Default for ChannelConditions {
    fn default() -> Self {
        Self::perfect()
    }
}

/// What the channel did to the frames shown so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Frames put on screen
    pub shown: usize,
    /// Frames never captured
    pub dropped: usize,
    /// Frames captured twice
    pub duplicated: usize,
    /// Captures handed to the receiver
    pub delivered: usize,
}

/// Seeded lossy, duplicating, reordering channel.
#[derive(Debug, Clone)]
pub struct VisualChannel {
    conditions: ChannelConditions,
    rng: ChaCha8Rng,
    in_flight: Vec<String>,
    stats: ChannelStats,
}

impl VisualChannel {
    /// Channel with `conditions`, replayable from `seed`.
    ///
    /// # Errors
    ///
    /// [`ChannelError::InvalidRate`] if `conditions` fails validation.
    pub fn new(conditions: ChannelConditions, seed: u64) -> Result<Self, ChannelError> {
        conditions.validate()?;
        Ok(Self {
            conditions,
            rng: ChaCha8Rng::seed_from_u64(seed),
            in_flight: Vec::new(),
            stats: ChannelStats::default(),
        })
    }

    /// Show one frame. Returns the captures released by this step.
    pub fn show(&mut self, frame: String) -> Vec<String> {
        self.stats.shown += 1;

        if self.rng.gen_bool(self.conditions.loss_rate) {
            self.stats.dropped += 1;
            tracing::trace!(shown = self.stats.shown, "Frame dropped");
        } else {
            if self.rng.gen_bool(self.conditions.duplicate_rate) {
                self.stats.duplicated += 1;
                self.in_flight.push(frame.clone());
            }
            self.in_flight.push(frame);
        }

        let mut released = Vec::new();
        while self.in_flight.len() > self.conditions.reorder_window {
            released.push(self.take_random());
        }
        self.stats.delivered += released.len();
        released
    }

    /// Release every held frame, in random order.
    pub fn flush(&mut self) -> Vec<String> {
        let mut released = Vec::with_capacity(self.in_flight.len());
        while !self.in_flight.is_empty() {
            released.push(self.take_random());
        }
        self.stats.delivered += released.len();
        released
    }

    fn take_random(&mut self) -> String {
        let index = self.rng.gen_range(0..self.in_flight.len());
        self.in_flight.swap_remove(index)
    }

    /// Counters so far.
    pub fn stats(&self) -> ChannelStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn perfect_channel_keeps_order() {
        let mut channel = VisualChannel::new(ChannelConditions::perfect(), 1).unwrap();
        let delivered: Vec<String> = frames(20).into_iter().flat_map(|f| channel.show(f)).collect();
        assert_eq!(delivered, frames(20));
        assert!(channel.flush().is_empty());
    }

    #[test]
    fn same_seed_same_faults() {
        let conditions = ChannelConditions::lossy(0.3).with_duplicates(0.2).with_reordering(4);
        let run = |seed| {
            let mut channel = VisualChannel::new(conditions, seed).unwrap();
            let mut delivered: Vec<String> = frames(200).into_iter().flat_map(|f| channel.show(f)).collect();
            delivered.extend(channel.flush());
            (delivered, channel.stats())
        };

        assert_eq!(run(7), run(7));
        assert_ne!(run(7).0, run(8).0);
    }

    #[test]
    fn stats_account_for_every_frame() {
        let conditions = ChannelConditions::lossy(0.25).with_duplicates(0.25).with_reordering(3);
        let mut channel = VisualChannel::new(conditions, 42).unwrap();
        for frame in frames(400) {
            channel.show(frame);
        }
        channel.flush();

        let stats = channel.stats();
        assert_eq!(stats.shown, 400);
        assert_eq!(stats.delivered, stats.shown - stats.dropped + stats.duplicated);
        assert!(stats.dropped > 0 && stats.duplicated > 0);
    }

    #[test]
    fn rejects_rates_outside_unit_interval() {
        assert_eq!(
            VisualChannel::new(ChannelConditions::lossy(1.5), 0).unwrap_err(),
            ChannelError::InvalidRate { name: "loss_rate", rate: 1.5 }
        );
        assert!(matches!(
            ChannelConditions::perfect().with_duplicates(f64::NAN).validate(),
            Err(ChannelError::InvalidRate { name: "duplicate_rate", .. })
        ));
        assert_eq!(
            ChannelConditions::lossy(-0.5).validate().unwrap_err().to_string(),
            "loss_rate must be within [0, 1], got -0.5"
        );
    }
}
