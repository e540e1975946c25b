//! Fountain decoder fed arbitrary part payloads.
//!
//! The input is split into chunks, each parsed as part CBOR and fed to one
//! decoder. Tests header validation (including forged fragment counts at the
//! default limits), subset reduction with hostile fragment lengths, and the
//! pending-part limit.

#![no_main]

use airgap_core::{DecoderConfig, FountainDecoder};
use airgap_proto::Part;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = DecoderConfig { max_pending_parts: 64, ..DecoderConfig::default() };
    let mut decoder = FountainDecoder::new(config);

    // First byte of each chunk gives the length of the chunk
    let mut rest = data;
    while let Some((&len, tail)) = rest.split_first() {
        let len = usize::from(len).min(tail.len());
        let (chunk, next) = tail.split_at(len);
        rest = next;

        if let Ok(part) = Part::from_cbor(chunk) {
            let _ = decoder.receive(&part);
        }
    }

    let _ = decoder.progress();
    let _ = decoder.message();
});
