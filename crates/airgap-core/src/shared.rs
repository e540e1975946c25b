//! Thread-safe handle to one decode session.
//!
//! Camera callbacks often deliver frames on a background thread while the UI
//! polls progress on another. [`SharedUrDecoder`] puts a single [`UrDecoder`]
//! behind a mutex; clones share the session. Independent transmissions should
//! use independent handles.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airgap_proto::{Result, UrType};

use crate::{
    config::DecoderConfig,
    decoder::{Progress, Reception},
    session::{Resolved, UrDecoder},
};

/// Cloneable, mutex-guarded [`UrDecoder`].
#[derive(Debug, Clone, Default)]
pub struct SharedUrDecoder {
    inner: Arc<Mutex<UrDecoder>>,
}

impl SharedUrDecoder {
    /// Shared decoder accepting any message type.
    pub fn new(config: DecoderConfig) -> Self {
        Self::from_decoder(UrDecoder::new(config))
    }

    /// Wrap an existing decoder.
    pub fn from_decoder(decoder: UrDecoder) -> Self {
        Self { inner: Arc::new(Mutex::new(decoder)) }
    }

    // `receive` validates before it mutates, so a poisoned session is still
    // consistent.
    fn lock(&self) -> MutexGuard<'_, UrDecoder> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`UrDecoder::receive`].
    pub fn receive(&self, text: &str) -> Result<Reception> {
        self.lock().receive(text)
    }

    /// See [`UrDecoder::is_complete`].
    pub fn is_complete(&self) -> bool {
        self.lock().is_complete()
    }

    /// See [`UrDecoder::progress`].
    pub fn progress(&self) -> Progress {
        self.lock().progress()
    }

    /// See [`UrDecoder::resolve`].
    pub fn resolve(&self) -> Result<Resolved> {
        self.lock().resolve()
    }

    /// See [`UrDecoder::resolve_as`].
    pub fn resolve_as(&self, expected: &UrType) -> Result<Vec<u8>> {
        self.lock().resolve_as(expected)
    }

    /// See [`UrDecoder::reset`].
    pub fn reset(&self) {
        self.lock().reset();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::{config::EncoderConfig, session::UrEncoder};

    #[test]
    fn parts_from_several_threads_complete_one_session() {
        let message: Vec<u8> = (0..2000u32).map(|i| (i * 7) as u8).collect();
        let ur_type = UrType::new("bytes").unwrap();
        let mut encoder =
            UrEncoder::new(ur_type.clone(), &message, &EncoderConfig::with_max_fragment_len(100))
                .unwrap();
        let parts: Vec<String> = (0..encoder.seq_len()).map(|_| encoder.next_part().unwrap()).collect();

        let shared = SharedUrDecoder::default();
        let handles: Vec<_> = parts
            .chunks(5)
            .map(|chunk| {
                let shared = shared.clone();
                let chunk = chunk.to_vec();
                thread::spawn(move || {
                    for part in chunk {
                        shared.receive(&part).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(shared.is_complete());
        assert_eq!(shared.resolve_as(&ur_type).unwrap(), message);
    }

    #[test]
    fn clones_observe_reset() {
        let shared = SharedUrDecoder::new(DecoderConfig::default());
        let other = shared.clone();
        let ur_type = UrType::new("bytes").unwrap();

        shared.receive(&airgap_proto::encode_single(&ur_type, b"\x40")).unwrap();
        assert!(other.is_complete());
        other.reset();
        assert!(!shared.is_complete());
        assert_eq!(shared.progress(), Progress { solved: 0, total: 0 });
    }
}
