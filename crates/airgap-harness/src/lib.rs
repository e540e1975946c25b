//! Deterministic simulation harness for the airgap transport.
//!
//! A seeded [`VisualChannel`] stands in for the screen and camera: it drops,
//! duplicates and reorders frames. [`Scenario`] runs one transmission through
//! it and hands the resulting [`World`] to an oracle. [`model`] holds the
//! reference model used by the model-based property tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod model;
pub mod scenario;

pub use channel::{ChannelConditions, ChannelError, ChannelStats, VisualChannel};
pub use model::{Expectation, ModelSession, Operation, Source};
pub use scenario::{OracleFn, RunnableScenario, Scenario, World};
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber. `RUST_LOG` selects the level
/// (default `warn`). Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
