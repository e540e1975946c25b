//! UR string parsing.
//!
//! Arbitrary text through the scanner entry points: the UR parser, both
//! bytewords styles, and a receive session. None of them may panic.

#![no_main]

use airgap_core::UrDecoder;
use airgap_proto::{Ur, bytewords};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = Ur::parse(text);
    let _ = bytewords::decode(text, bytewords::Style::Minimal);
    let _ = bytewords::decode(text, bytewords::Style::Standard);

    // Each line is one scan into the same session
    let mut decoder = UrDecoder::default();
    for line in text.lines() {
        let _ = decoder.receive(line);
    }
    let _ = decoder.resolve();
});
