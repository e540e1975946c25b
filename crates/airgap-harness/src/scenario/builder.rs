//! Scenario builder API.
//!
//! Provides a declarative API for constructing transport scenarios that
//! enforce the Oracle Pattern: a scenario cannot run without a check on the
//! final [`World`].

use airgap_core::{DecoderConfig, EncoderConfig, Reception};
use airgap_registry::{Receiver, Record, Transmitter};

use crate::{
    channel::{ChannelConditions, VisualChannel},
    scenario::{OracleFn, World},
};

/// Frames shown before a scenario gives up.
const DEFAULT_FRAME_BUDGET: usize = 10_000;

/// Interfering frames are shown after every this many transmitter frames.
const INTERFERENCE_PERIOD: usize = 3;

/// Scenario builder.
///
/// Describe one transmission (record, fragment size, channel faults, seed),
/// then call `.oracle()` to get a [`RunnableScenario`].
pub struct Scenario {
    name: String,
    record: Record,
    encoder: EncoderConfig,
    decoder: DecoderConfig,
    conditions: ChannelConditions,
    seed: u64,
    frame_budget: usize,
    interference: Option<Record>,
}

impl Scenario {
    /// Scenario transmitting `record` over a perfect channel.
    pub fn new(name: impl Into<String>, record: impl Into<Record>) -> Self {
        Self {
            name: name.into(),
            record: record.into(),
            encoder: EncoderConfig::default(),
            decoder: DecoderConfig::default(),
            conditions: ChannelConditions::perfect(),
            seed: 0,
            frame_budget: DEFAULT_FRAME_BUDGET,
            interference: None,
        }
    }

    /// Maximum fragment length of the transmitter.
    #[must_use]
    pub fn max_fragment_len(mut self, max_fragment_len: usize) -> Self {
        self.encoder.max_fragment_len = max_fragment_len;
        self
    }

    /// Receiver configuration.
    #[must_use]
    pub fn decoder_config(mut self, config: DecoderConfig) -> Self {
        self.decoder = config;
        self
    }

    /// Channel faults.
    #[must_use]
    pub fn channel(mut self, conditions: ChannelConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// RNG seed of the channel.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Frames shown before giving up.
    #[must_use]
    pub fn frame_budget(mut self, frame_budget: usize) -> Self {
        self.frame_budget = frame_budget;
        self
    }

    /// A second device showing `record` comes into view once the receiver
    /// has started a session.
    #[must_use]
    pub fn interference(mut self, record: impl Into<Record>) -> Self {
        self.interference = Some(record.into());
        self
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// Shows transmitter frames through the channel until the receiver
    /// completes or the frame budget runs out, resolves the record, then runs
    /// the oracle. Returns the final world for further inspection.
    pub fn run(self) -> Result<World, String> {
        let Self { scenario, oracle } = self;
        let name = scenario.name;
        let fail = |stage: &str, err: &dyn std::fmt::Display| format!("Scenario '{name}': {stage}: {err}");

        let mut transmitter =
            Transmitter::for_record(&scenario.record, &scenario.encoder).map_err(|e| fail("transmitter", &e))?;
        let mut interferer = scenario
            .interference
            .as_ref()
            .map(|record| Transmitter::for_record(record, &scenario.encoder))
            .transpose()
            .map_err(|e| fail("interferer", &e))?;
        let mut channel = VisualChannel::new(scenario.conditions, scenario.seed).map_err(|e| fail("channel", &e))?;
        let mut receiver = Receiver::new(scenario.decoder);
        let mut world = World::new(scenario.record, transmitter.seq_len());

        while world.frames_shown() < scenario.frame_budget && !receiver.is_complete() {
            let frame = transmitter.next_part().map_err(|e| fail("next_part", &e))?;
            world.record_frame_shown();
            let mut captures = channel.show(frame);

            let session_started = receiver.progress().total > 0;
            if let Some(interferer) = interferer.as_mut()
                && session_started
                && world.frames_shown() % INTERFERENCE_PERIOD == 0
            {
                let frame = interferer.next_part().map_err(|e| fail("interferer", &e))?;
                world.record_interference_shown();
                captures.extend(channel.show(frame));
            }

            if world.frames_shown() == scenario.frame_budget {
                captures.extend(channel.flush());
            }

            for capture in captures {
                match receiver.receive(&capture) {
                    Ok(reception) => {
                        world.record_accepted(receiver.progress());
                        if reception == Reception::Complete {
                            world.record_complete();
                        }
                    },
                    Err(err) => {
                        tracing::debug!(scenario = %name, error = %err, "Capture rejected");
                        world.record_rejection(err);
                    },
                }
            }
        }

        world.finish(receiver.resolve_record(), channel.stats());
        tracing::debug!(
            scenario = %name,
            frames = world.frames_shown(),
            seq_len = world.seq_len(),
            rejections = world.rejections().len(),
            "Scenario finished"
        );

        oracle(&world).map_err(|e| fail("oracle", &e))?;
        Ok(world)
    }
}
