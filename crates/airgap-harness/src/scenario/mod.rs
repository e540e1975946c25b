//! Scenario tests with mandatory oracles.
//!
//! ```ignore
//! Scenario::new("lossy hdkey", key)
//!     .max_fragment_len(40)
//!     .channel(ChannelConditions::lossy(0.3))
//!     .seed(7)
//!     .oracle(Box::new(|world| world.delivered_intact()))
//!     .run()?;
//! ```

mod builder;
mod world;

pub use builder::{RunnableScenario, Scenario};
pub use world::World;

/// Check run against the final world.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String>>;
