//! Fountain-coded transport sessions.
//!
//! A message too large for one QR code is split into fragments and served as
//! an endless stream of parts: first each fragment once, then XOR mixes of
//! pseudo-randomly chosen fragments. A receiver that misses frames keeps
//! scanning; any sufficiently large subset of parts reconstructs the message.
//!
//! All types here are pure state machines over in-memory buffers. No I/O, no
//! clocks, no global state.
//!
//! # Architecture
//!
//! ```text
//! message ─► FountainEncoder ─► Part ─► UrEncoder ─► "UR:TYPE/n-m/..." ─┐
//!                                                                       │ QR
//! message ◄─ FountainDecoder ◄─ Part ◄─ UrDecoder ◄─ "UR:TYPE/n-m/..." ◄┘
//! ```
//!
//! # Security
//!
//! Parts are untrusted. The decoder rejects inconsistent headers, messages
//! above [`DecoderConfig::max_message_len`] and parts that contradict earlier
//! ones, and verifies the CRC-32 of every reassembled message before handing
//! it out.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod fragments;
pub mod random;
pub mod sampler;
pub mod session;
pub mod shared;

pub use config::{DecoderConfig, EncoderConfig};
pub use decoder::{FountainDecoder, Progress, Reception};
pub use encoder::FountainEncoder;
pub use fragments::{FragmentSet, choose_fragments};
pub use random::FountainRng;
pub use session::{Resolved, UrDecoder, UrEncoder};
pub use shared::SharedUrDecoder;
